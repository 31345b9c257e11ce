use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ebash", version, about = "e-bash: a small interactive shell")]
pub struct Cli {
    /// Run one command line and exit with its status
    #[arg(short = 'c', value_name = "LINE")]
    pub command: Option<String>,

    /// Read settings from this file instead of ~/.ebashrc.toml
    #[arg(long, value_name = "PATH", conflicts_with = "no_rc")]
    pub config: Option<PathBuf>,

    /// Skip the settings file entirely
    #[arg(long = "no-rc")]
    pub no_rc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_flags() {
        let cli = Cli::try_parse_from(["ebash", "-c", "echo hi | cat", "--no-rc"]).unwrap();
        assert_eq!(cli.command.as_deref(), Some("echo hi | cat"));
        assert!(cli.no_rc);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_config_conflicts_with_no_rc() {
        assert!(Cli::try_parse_from(["ebash", "--config", "x.toml", "--no-rc"]).is_err());
        let cli = Cli::try_parse_from(["ebash", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(cli.command.is_none());
    }
}
