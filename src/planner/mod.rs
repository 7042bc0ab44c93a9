//! Filter graph and engine command planning module

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::model::{SubtitleStyle, SubtitleTrack, ALIGNMENT_BOTTOM_CENTER};

pub mod command;
pub mod filter_graph;

pub use command::{CommandBuilder, EngineInvocation};
pub use filter_graph::{escape_graph_token, escape_option_value, SubtitleFilterGraphBuilder};

/// Label of the video input pad
pub const INPUT_LABEL: &str = "0:v";
/// Label of the final video output pad
pub const OUTPUT_LABEL: &str = "vout";
/// Frame height cap applied when downscaling is requested
pub const DOWNSCALE_MAX_HEIGHT: u32 = 720;

/// One stage of the video filter chain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum FilterStage {
    /// Cap the frame height, keeping aspect ratio and even dimensions
    Scale { max_height: u32 },
    /// Burn one subtitle track into the frame
    BurnSubtitles {
        track: SubtitleTrack,
        path: PathBuf,
        margin_v: u32,
    },
}

impl FilterStage {
    fn render(&self, style: &SubtitleStyle) -> String {
        match self {
            // Height is floored to even and never upscaled; -2 keeps the
            // aspect ratio with an even width.
            FilterStage::Scale { max_height } => {
                format!("scale=w=-2:h=2*trunc(min({max_height},ih)/2)")
            }
            FilterStage::BurnSubtitles { path, margin_v, .. } => {
                let force_style = format!(
                    "Alignment={},MarginV={},FontName={},Fontsize={},Outline={},Shadow={}",
                    ALIGNMENT_BOTTOM_CENTER,
                    margin_v,
                    style.font_name,
                    style.font_size,
                    style.outline_width,
                    style.shadow_depth
                );
                format!(
                    "subtitles=filename={}:charenc=UTF-8:force_style={}",
                    escape_option_value(&path.to_string_lossy()),
                    escape_option_value(&force_style)
                )
            }
        }
    }
}

/// Ordered chain of video filter stages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
    style: SubtitleStyle,
}

impl FilterGraph {
    pub(crate) fn new(stages: Vec<FilterStage>, style: SubtitleStyle) -> Self {
        Self { stages, style }
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn has_scale_stage(&self) -> bool {
        self.stages
            .iter()
            .any(|stage| matches!(stage, FilterStage::Scale { .. }))
    }

    /// Position of the burn stage for `track`
    pub fn burn_position(&self, track: SubtitleTrack) -> Option<usize> {
        self.stages.iter().position(|stage| {
            matches!(stage, FilterStage::BurnSubtitles { track: t, .. } if *t == track)
        })
    }

    /// Render as a labelled filter graph ending in [`OUTPUT_LABEL`]
    pub fn render(&self) -> String {
        let last = self.stages.len().saturating_sub(1);
        let mut chains = Vec::with_capacity(self.stages.len());
        let mut input = INPUT_LABEL.to_string();

        for (index, stage) in self.stages.iter().enumerate() {
            let output = if index == last {
                OUTPUT_LABEL.to_string()
            } else {
                format!("v{}", index + 1)
            };
            chains.push(format!(
                "[{}]{}[{}]",
                input,
                escape_graph_token(&stage.render(&self.style)),
                output
            ));
            input = output;
        }

        chains.join(";")
    }
}
