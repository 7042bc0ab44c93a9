//! Subtitle filter graph builder

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::model::{SubtitleStyle, SubtitleTrack};
use crate::error::{EmbedError, EmbedResult};
use crate::planner::{FilterGraph, FilterStage, DOWNSCALE_MAX_HEIGHT};

/// Escape a value for use inside a filter's option list.
///
/// First escaping level: `\`, `'` and the `:` option separator.
pub fn escape_option_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' | '\'' | ':' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape a filter description for embedding in a filter graph.
///
/// Second escaping level: characters the graph parser treats as structure.
pub fn escape_graph_token(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 16);
    for ch in value.chars() {
        match ch {
            '\\' | '\'' | '[' | ']' | ',' | ';' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Check that a subtitle file exists and is UTF-8 text
pub fn validate_subtitle_file(path: &Path) -> EmbedResult<()> {
    let bytes = fs::read(path).map_err(|e| EmbedError::InvalidSubtitleEncoding {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    std::str::from_utf8(&bytes).map_err(|e| EmbedError::InvalidSubtitleEncoding {
        path: path.to_path_buf(),
        reason: format!("invalid UTF-8 sequence after byte {}", e.valid_up_to()),
    })?;

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        warn!("Subtitle file {} has no cues", path.display());
    }

    Ok(())
}

/// Builds the scale + dual burn-in filter chain
#[derive(Debug, Clone)]
pub struct SubtitleFilterGraphBuilder {
    style: SubtitleStyle,
}

impl SubtitleFilterGraphBuilder {
    pub fn new(style: SubtitleStyle) -> Self {
        Self { style }
    }

    /// Build the filter graph for a source/target subtitle pair.
    ///
    /// Stage order never depends on the inputs: optional scale first so the
    /// burned text is not resampled, then the target track at the bottom
    /// offset, then the source track at the top offset.
    pub fn build(
        &self,
        source_subtitle: &Path,
        target_subtitle: &Path,
        downscale: bool,
    ) -> EmbedResult<FilterGraph> {
        self.style.validate()?;
        validate_subtitle_file(source_subtitle)?;
        validate_subtitle_file(target_subtitle)?;

        let mut stages = Vec::with_capacity(3);
        if downscale {
            stages.push(FilterStage::Scale {
                max_height: DOWNSCALE_MAX_HEIGHT,
            });
        }
        stages.push(FilterStage::BurnSubtitles {
            track: SubtitleTrack::Target,
            path: target_subtitle.to_path_buf(),
            margin_v: self.style.vertical_offset_bottom,
        });
        stages.push(FilterStage::BurnSubtitles {
            track: SubtitleTrack::Source,
            path: source_subtitle.to_path_buf(),
            margin_v: self.style.vertical_offset_top,
        });

        let graph = FilterGraph::new(stages, self.style.clone());
        debug!("Built filter graph: {}", graph.render());
        Ok(graph)
    }
}
