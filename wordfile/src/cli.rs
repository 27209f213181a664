use std::path::PathBuf;

use structopt::clap::AppSettings::*;
use structopt::StructOpt;
use wordfile_format::{CompactOptions, Compaction, LengthOrder, Rendering, StoreOptions, UniqueOrder};

#[derive(Debug, Clone, StructOpt)]
pub struct ListArgs {
    #[structopt(long, help = "Print tokens as a JSON array")]
    pub json: bool,
}

#[derive(Debug, Clone, StructOpt)]
pub struct UniqueArgs {
    #[structopt(
        short = "f",
        long,
        default_value = "parenthesized",
        possible_values = &["parenthesized", "spaced"],
        help = "Entry format: `word(count)` or `word count`"
    )]
    pub format: Rendering,

    #[structopt(
        short = "o",
        long,
        default_value = "first",
        possible_values = &["first", "length"],
        help = "Entry order: first occurrence, or by length then alphabetically"
    )]
    pub order: UniqueOrder,

    #[structopt(
        short = "a",
        long,
        help = "Treat entries already in the chosen format as counted words"
    )]
    pub accumulate: bool,
}

impl UniqueArgs {
    pub fn options(&self) -> CompactOptions {
        CompactOptions {
            rendering: self.format,
            order: self.order,
            compaction: if self.accumulate {
                Compaction::Accumulate
            } else {
                Compaction::Fresh
            },
        }
    }
}

#[derive(Debug, Clone, StructOpt)]
pub struct SortArgs {
    #[structopt(
        short = "l",
        long,
        help = "Order tokens of equal length alphabetically instead of by position"
    )]
    pub lexical: bool,
}

impl SortArgs {
    pub fn order(&self) -> LengthOrder {
        if self.lexical {
            LengthOrder::Lexical
        } else {
            LengthOrder::Stable
        }
    }
}

#[derive(Debug, StructOpt)]
pub enum Commands {
    #[structopt(name = "count", about = "Print the number of tokens in a store")]
    Count {
        #[structopt(name = "store", parse(from_os_str), help = "Path to the token store")]
        path: PathBuf,
    },

    #[structopt(name = "list", visible_alias = "ls", about = "List every token of a store")]
    List {
        #[structopt(name = "store", parse(from_os_str), help = "Path to the token store")]
        path: PathBuf,

        #[structopt(flatten)]
        args: ListArgs,
    },

    #[structopt(
        name = "unique",
        about = "Keep only unique tokens, annotated with their repetition count",
        after_help = "Entries are longer than the words they count. A word close to \
                      --max-token-len can produce an entry that only reads back with a \
                      larger limit, or with --max-token-len 0."
    )]
    Unique {
        #[structopt(name = "store", parse(from_os_str), help = "Path to the token store")]
        path: PathBuf,

        #[structopt(flatten)]
        args: UniqueArgs,
    },

    #[structopt(name = "sort", about = "Sort tokens by length, shortest first")]
    Sort {
        #[structopt(name = "store", parse(from_os_str), help = "Path to the token store")]
        path: PathBuf,

        #[structopt(flatten)]
        args: SortArgs,
    },

    #[structopt(name = "shell", about = "Run an interactive session on standard input")]
    Shell,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "wordfile",
    about = "Inspect and rewrite whitespace-delimited token stores.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands]
)]
pub struct CliOpts {
    #[structopt(short, long, help = "Show debug logging", global = true)]
    pub verbose: bool,

    #[structopt(
        long,
        global = true,
        help = "Longest token in characters a read may return (0 for unbounded; store default if omitted)"
    )]
    pub max_token_len: Option<usize>,

    #[structopt(subcommand)]
    pub cmd: Commands,
}

impl CliOpts {
    pub fn store_options(&self) -> StoreOptions {
        match self.max_token_len {
            None => StoreOptions::default(),
            Some(0) => StoreOptions::default().with_max_token_len(None),
            Some(n) => StoreOptions::default().with_max_token_len(Some(n)),
        }
    }
}

/// One line of the interactive shell.
#[derive(Debug, StructOpt)]
#[structopt(name = "wordfile", no_version, global_settings = &[VersionlessSubcommands])]
pub enum ShellCommand {
    #[structopt(name = "open", about = "Open a store, closing the current one")]
    Open {
        #[structopt(name = "store", parse(from_os_str), help = "Path to the token store")]
        path: PathBuf,

        #[structopt(short, long, help = "Open for writing instead of reading")]
        write: bool,
    },

    #[structopt(name = "count", about = "Print the number of tokens")]
    Count,

    #[structopt(name = "list", visible_alias = "ls", about = "List every token")]
    List(ListArgs),

    #[structopt(name = "unique", about = "Keep only unique tokens with repetition counts")]
    Unique(UniqueArgs),

    #[structopt(name = "sort", about = "Sort tokens by length")]
    Sort(SortArgs),

    #[structopt(name = "close", about = "Close the current store")]
    Close,

    #[structopt(name = "exit", visible_alias = "quit", about = "Close the store and leave")]
    Exit,
}
