use clap::{CommandFactory, Parser};

const AFTER_HELP: &str = "Repository should be owner/repository from GitHub, e.g. mysociety/pombola";

#[derive(Parser, Debug)]
#[command(
    name = "issue-printer",
    version,
    about = "Archive every issue of a GitHub repository as Markdown documents",
    override_usage = "issue-printer [OPTIONS] REPOSITORY",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Run the built-in image rewriting checks instead of fetching
    #[arg(short = 't', long = "test")]
    pub test: bool,

    /// owner/repository to archive
    #[arg(value_name = "REPOSITORY", num_args = 0..)]
    pub args: Vec<String>,
}

impl Cli {
    /// The repository argument, when exactly one positional was given
    pub fn repository(&self) -> Option<&str> {
        match self.args.as_slice() {
            [repo] => Some(repo.as_str()),
            _ => None,
        }
    }

    /// Print the help text to stdout
    pub fn print_usage() -> std::io::Result<()> {
        Cli::command().print_help()?;
        println!();
        Ok(())
    }
}
