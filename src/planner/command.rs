//! Engine command line construction

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::model::EncodeProfile;
use crate::planner::{FilterGraph, OUTPUT_LABEL};

/// Container written by every job
pub const OUTPUT_FORMAT: &str = "mp4";

/// A fully resolved engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct EngineInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl EngineInvocation {
    /// Arguments as lossy UTF-8, for logging and dry runs
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// Path the engine writes to (its last argument)
    pub fn output_path(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }
}

impl fmt::Display for EngineInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in self.args_lossy() {
            write!(f, " {}", shell_quote(&arg))?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:+=,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Command builder for generating engine command lines
pub struct CommandBuilder;

impl CommandBuilder {
    /// Build the burn-in encode command.
    ///
    /// Progress records go to stdout (`-progress pipe:1`), diagnostics to
    /// stderr. The engine never reads stdin.
    pub fn build_embed_command(
        engine: &Path,
        video: &Path,
        graph: &FilterGraph,
        profile: &EncodeProfile,
        output: &Path,
    ) -> EngineInvocation {
        let mut args: Vec<OsString> = Vec::with_capacity(40);
        let mut push = |arg: &str| args.push(OsString::from(arg));

        push("-hide_banner");
        push("-nostdin");
        push("-y");
        push("-loglevel");
        push("warning");
        push("-progress");
        push("pipe:1");
        push("-nostats");
        push("-i");
        args.push(video.as_os_str().to_owned());

        let mut push = |arg: &str| args.push(OsString::from(arg));
        push("-filter_complex");
        push(&graph.render());
        push("-map");
        push(&format!("[{}]", OUTPUT_LABEL));
        // Optional so silent videos still encode
        push("-map");
        push("0:a?");

        push("-c:v");
        push(profile.video_codec.encoder_name());
        push("-preset");
        push(profile.encode_speed_preset);
        push("-crf");
        push(&profile.quality_parameter.to_string());
        if let Some(tag) = profile.video_codec.mp4_tag() {
            push("-tag:v");
            push(tag);
        }
        push("-pix_fmt");
        push("yuv420p");

        push("-c:a");
        push("aac");
        push("-b:a");
        push(&format!("{}k", profile.audio_bitrate_kbps));

        push("-movflags");
        push("+faststart");
        push("-f");
        push(OUTPUT_FORMAT);
        args.push(output.as_os_str().to_owned());

        EngineInvocation {
            program: engine.to_path_buf(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompressionTier, SubtitleStyle, SubtitleTrack};
    use crate::domain::rules::CompressionProfileResolver;
    use crate::planner::FilterStage;

    fn create_test_graph() -> FilterGraph {
        FilterGraph::new(
            vec![
                FilterStage::BurnSubtitles {
                    track: SubtitleTrack::Target,
                    path: PathBuf::from("/subs/vi.srt"),
                    margin_v: 24,
                },
                FilterStage::BurnSubtitles {
                    track: SubtitleTrack::Source,
                    path: PathBuf::from("/subs/en.srt"),
                    margin_v: 60,
                },
            ],
            SubtitleStyle::default(),
        )
    }

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|index| args.get(index + 1).cloned())
    }

    #[test]
    fn test_build_embed_command_for_normal_tier() {
        let profile = CompressionProfileResolver::resolve(CompressionTier::Normal);
        let invocation = CommandBuilder::build_embed_command(
            Path::new("/usr/bin/ffmpeg"),
            Path::new("/videos/movie.mp4"),
            &create_test_graph(),
            &profile,
            Path::new("/videos/.movie_dual_subbed.part.mp4"),
        );
        let args = invocation.args_lossy();

        assert_eq!(value_after(&args, "-i").as_deref(), Some("/videos/movie.mp4"));
        assert_eq!(value_after(&args, "-c:v").as_deref(), Some("libx264"));
        assert_eq!(value_after(&args, "-crf").as_deref(), Some("18"));
        assert_eq!(value_after(&args, "-b:a").as_deref(), Some("192k"));
        assert_eq!(value_after(&args, "-map").as_deref(), Some("[vout]"));
        assert_eq!(value_after(&args, "-progress").as_deref(), Some("pipe:1"));
        assert!(!args.contains(&"-tag:v".to_string()));
        assert_eq!(
            invocation.output_path(),
            Some(Path::new("/videos/.movie_dual_subbed.part.mp4"))
        );
    }

    #[test]
    fn test_smallest_tier_tags_hevc() {
        let profile = CompressionProfileResolver::resolve(CompressionTier::Smallest);
        let invocation = CommandBuilder::build_embed_command(
            Path::new("ffmpeg"),
            Path::new("in.mkv"),
            &create_test_graph(),
            &profile,
            Path::new("out.mp4"),
        );
        let args = invocation.args_lossy();
        assert_eq!(value_after(&args, "-tag:v").as_deref(), Some("hvc1"));
        assert_eq!(value_after(&args, "-c:v").as_deref(), Some("libx265"));
    }

    #[test]
    fn test_input_precedes_filter_graph() {
        let profile = CompressionProfileResolver::resolve(CompressionTier::Smaller);
        let args = CommandBuilder::build_embed_command(
            Path::new("ffmpeg"),
            Path::new("in.mp4"),
            &create_test_graph(),
            &profile,
            Path::new("out.mp4"),
        )
        .args_lossy();

        let input_at = args.iter().position(|a| a == "-i").unwrap();
        let graph_at = args.iter().position(|a| a == "-filter_complex").unwrap();
        assert!(input_at < graph_at);
    }

    #[test]
    fn test_display_quotes_arguments_with_spaces() {
        let invocation = EngineInvocation {
            program: PathBuf::from("ffmpeg"),
            args: vec![OsString::from("-i"), OsString::from("my movie.mp4")],
        };
        assert_eq!(invocation.to_string(), "ffmpeg -i 'my movie.mp4'");
    }
}
