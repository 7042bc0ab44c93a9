// Domain rules - Business logic and policies

use crate::domain::model::*;

/// Business rules mapping a compression tier to encode parameters
pub struct CompressionProfileResolver;

impl CompressionProfileResolver {
    /// Resolve the encode profile for a tier.
    ///
    /// Total over every tier and monotonic: each step down in tier raises the
    /// CRF and lowers the audio bitrate, so expected output size shrinks.
    pub fn resolve(tier: CompressionTier) -> EncodeProfile {
        match tier {
            CompressionTier::Normal => EncodeProfile {
                video_codec: VideoCodec::H264,
                quality_parameter: 18,
                encode_speed_preset: "medium",
                audio_bitrate_kbps: 192,
            },
            CompressionTier::Smaller => EncodeProfile {
                video_codec: VideoCodec::H264,
                quality_parameter: 24,
                encode_speed_preset: "medium",
                audio_bitrate_kbps: 160,
            },
            // x265 at CRF 28 lands well below x264 at CRF 24 for the same content
            CompressionTier::Smallest => EncodeProfile {
                video_codec: VideoCodec::H265,
                quality_parameter: 28,
                encode_speed_preset: "medium",
                audio_bitrate_kbps: 128,
            },
        }
    }
}
