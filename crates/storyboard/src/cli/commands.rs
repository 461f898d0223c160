//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use storyboard::{AspectRatio, FrameCount};

/// Storyboard - multi-scene visual storyboards from a story prompt
#[derive(Parser, Debug)]
#[command(name = "storyboard")]
#[command(about = "Generate multi-scene visual storyboards from a story prompt", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new storyboard
    Generate(GenerateArgs),

    /// Append one scene to an existing storyboard
    Continue(ContinueArgs),
}

/// Arguments for `generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Story to illustrate
    #[command(flatten)]
    pub story: StorySource,

    /// Number of frames (two per scene)
    #[arg(long, default_value = "4", value_parser = parse_frame_count)]
    pub frames: FrameCount,

    /// Frame aspect ratio
    #[arg(long, default_value = "16:9")]
    pub aspect: AspectRatio,

    /// Reference images
    #[command(flatten)]
    pub references: ReferenceArgs,

    /// Where to write the storyboard JSON
    #[arg(short, long, default_value = "storyboard.json")]
    pub output: PathBuf,
}

/// Arguments for `continue`.
#[derive(Args, Debug)]
pub struct ContinueArgs {
    /// Storyboard JSON to continue
    #[arg(long)]
    pub storyboard: PathBuf,

    /// Direction for the next scene
    #[arg(long)]
    pub instruction: Option<String>,

    /// Reference images
    #[command(flatten)]
    pub references: ReferenceArgs,

    /// Where to write the extended storyboard (defaults to the input file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Story text given inline or as a file.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct StorySource {
    /// Story text
    #[arg(long)]
    pub story: Option<String>,

    /// File containing the story text
    #[arg(long)]
    pub story_file: Option<PathBuf>,
}

/// Optional reference image files.
#[derive(Args, Debug, Default)]
pub struct ReferenceArgs {
    /// Main character reference image
    #[arg(long)]
    pub main_character: Option<PathBuf>,

    /// Secondary character reference image (repeatable, up to 9)
    #[arg(long = "secondary")]
    pub secondary: Vec<PathBuf>,

    /// Background reference image
    #[arg(long)]
    pub background: Option<PathBuf>,

    /// Art style reference image
    #[arg(long)]
    pub art_style: Option<PathBuf>,

    /// Logo image
    #[arg(long)]
    pub logo: Option<PathBuf>,
}

fn parse_frame_count(value: &str) -> Result<FrameCount, String> {
    let frames: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    FrameCount::try_from(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_parses_flags() {
        let cli = Cli::try_parse_from([
            "storyboard",
            "generate",
            "--story",
            "A fox searches a forest for a lost key",
            "--frames",
            "6",
            "--aspect",
            "9:16",
            "--secondary",
            "owl.png",
            "--secondary",
            "badger.png",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.frames.scene_count(), 3);
                assert_eq!(args.aspect, AspectRatio::Portrait);
                assert_eq!(args.references.secondary.len(), 2);
                assert_eq!(args.output, PathBuf::from("storyboard.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn generate_rejects_odd_frame_count() {
        let result = Cli::try_parse_from(["storyboard", "generate", "--story", "x", "--frames", "5"]);
        assert!(result.is_err());
    }

    #[test]
    fn generate_requires_one_story_source() {
        assert!(Cli::try_parse_from(["storyboard", "generate"]).is_err());
        assert!(
            Cli::try_parse_from([
                "storyboard",
                "generate",
                "--story",
                "x",
                "--story-file",
                "story.txt"
            ])
            .is_err()
        );
    }

    #[test]
    fn continue_parses_instruction() {
        let cli = Cli::try_parse_from([
            "storyboard",
            "--verbose",
            "continue",
            "--storyboard",
            "board.json",
            "--instruction",
            "Night falls",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Continue(args) => {
                assert_eq!(args.instruction.as_deref(), Some("Night falls"));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
