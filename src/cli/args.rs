//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{Color, Order, VariantKind};

/// Binary and red-black tree records: inspect, compare, convert and draw them
#[derive(Parser, Debug)]
#[command(name = "treediag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Tree variant of the input records
    #[arg(long, value_enum, default_value_t = VariantArg::Auto, global = true)]
    pub variant: VariantArg,

    /// JSON pointer selecting the tree record inside the input, e.g. /answer
    #[arg(long, global = true)]
    pub pointer: Option<String>,

    /// Directory searched for .treediag.toml (default: cwd)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a tree as text
    Show {
        /// Tree record file, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: String,
    },

    /// Print node values in traversal order
    Traverse {
        #[arg(value_hint = ValueHint::FilePath)]
        file: String,
        #[arg(short, long, value_enum, default_value_t = OrderArg::In)]
        order: OrderArg,
    },

    /// Compare two trees (exit 1 unless deep-equal)
    Compare {
        #[arg(value_hint = ValueHint::FilePath)]
        left: String,
        #[arg(value_hint = ValueHint::FilePath)]
        right: String,
    },

    /// Convert a tree into a red-black record with every node one color
    Colorize {
        #[arg(value_hint = ValueHint::FilePath)]
        file: String,
        #[arg(short, long, value_enum, default_value_t = ColorArg::Black)]
        color: ColorArg,
    },

    /// Print the padded diagram layout
    Layout {
        #[arg(value_hint = ValueHint::FilePath)]
        file: String,
        /// Draw absent children as NIL markers
        #[arg(long, overrides_with = "no_sentinels")]
        sentinels: bool,
        /// Hide absent children
        #[arg(long, overrides_with = "sentinels")]
        no_sentinels: bool,
        #[arg(short, long, value_enum, default_value_t = LayoutFormat::Json)]
        format: LayoutFormat,
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Render a tree diagram with Graphviz
    Render {
        #[arg(value_hint = ValueHint::FilePath)]
        file: String,
        /// Output image path
        #[arg(short, long, value_hint = ValueHint::FilePath, required_unless_present = "base64")]
        output: Option<PathBuf>,
        #[arg(short, long)]
        title: Option<String>,
        /// Print the image as base64 instead of writing a file
        #[arg(long)]
        base64: bool,
    },

    /// Render a tree diagram and open it in the image viewer
    View {
        #[arg(value_hint = ValueHint::FilePath)]
        file: String,
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Print the effective configuration
    Config {
        /// Print a commented template instead
        #[arg(long)]
        template: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantArg {
    Plain,
    Colored,
    /// Colored when the root record has a color key
    Auto,
}

impl VariantArg {
    pub fn kind(self) -> Option<VariantKind> {
        match self {
            VariantArg::Plain => Some(VariantKind::Plain),
            VariantArg::Colored => Some(VariantKind::Colored),
            VariantArg::Auto => None,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    Pre,
    In,
    Post,
}

impl From<OrderArg> for Order {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Pre => Order::Pre,
            OrderArg::In => Order::In,
            OrderArg::Post => Order::Post,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum ColorArg {
    Red,
    Black,
}

impl From<ColorArg> for Color {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Red => Color::Red,
            ColorArg::Black => Color::Black,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    Json,
    Dot,
}
