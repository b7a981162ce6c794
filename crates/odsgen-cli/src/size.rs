use clap::ValueEnum;

use odsgen_generate::TargetSize;

/// Target sizes accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizePreset {
    /// 1 GB
    #[value(name = "1")]
    OneGb,
    /// 5 GB
    #[value(name = "5")]
    FiveGb,
    /// 5 MB
    #[value(name = "5MB")]
    FiveMb,
}

impl SizePreset {
    pub fn target(self) -> TargetSize {
        match self {
            Self::OneGb => TargetSize::gigabytes(1),
            Self::FiveGb => TargetSize::gigabytes(5),
            Self::FiveMb => TargetSize::megabytes(5),
        }
    }

    /// Lowercase token used in output file names.
    pub fn file_token(self) -> &'static str {
        match self {
            Self::OneGb => "1gb",
            Self::FiveGb => "5gb",
            Self::FiveMb => "5mb",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_map_to_bytes_and_tokens() {
        assert_eq!(SizePreset::OneGb.target().bytes, 1024 * 1024 * 1024);
        assert_eq!(SizePreset::FiveGb.target().bytes, 5 * 1024 * 1024 * 1024);
        assert_eq!(SizePreset::FiveMb.target().bytes, 5 * 1024 * 1024);
        assert_eq!(SizePreset::FiveMb.file_token(), "5mb");
    }

    #[test]
    fn parses_command_line_names() {
        assert_eq!(SizePreset::from_str("1", false), Ok(SizePreset::OneGb));
        assert_eq!(SizePreset::from_str("5MB", false), Ok(SizePreset::FiveMb));
        assert_eq!(SizePreset::from_str("5mb", true), Ok(SizePreset::FiveMb));
        assert!(SizePreset::from_str("10", false).is_err());
    }
}
