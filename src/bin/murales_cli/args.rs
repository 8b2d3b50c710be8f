//! Command-line surface for `murales-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use murales::config::ConfigOverrides;
use murales_api_types::MuralStatus;

#[derive(Parser, Debug)]
#[command(
    name = "murales-cli",
    version,
    about = "Browse, submit and moderate Buenos Aires street art",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Approved murals (list/map/show)
    Murals(MuralsArgs),
    /// Values available for the region filters
    Filters(FiltersArgs),
    /// Resolve the address of a point
    Geocode(PointArgs),
    /// Submit a new mural for review
    Submit(SubmitArgs),
    /// Administrator session and moderation
    Admin(AdminArgs),
}

#[derive(Parser, Debug)]
pub struct MuralsArgs {
    #[command(subcommand)]
    pub action: MuralsCmd,
}

#[derive(Subcommand, Debug)]
pub enum MuralsCmd {
    /// One page of murals, optionally filtered
    List {
        /// Free-text match on the mural name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        municipality: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search by name, reading typed text line by line from stdin
    Search,
    /// Every approved mural with its coordinates
    Map,
    /// A single mural
    Show { id: String },
}

#[derive(Parser, Debug)]
pub struct FiltersArgs {
    #[command(subcommand)]
    pub action: FiltersCmd,
}

#[derive(Subcommand, Debug)]
pub enum FiltersCmd {
    Provinces,
    Municipalities {
        #[arg(long)]
        province: String,
    },
    Neighborhoods {
        #[arg(long)]
        province: String,
        #[arg(long)]
        municipality: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PointArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Contact address for the review outcome
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub name: Option<String>,
    #[command(flatten)]
    pub point: PointArgs,
    /// Local image to upload to the image host
    #[arg(long, value_name = "PATH", conflicts_with = "image_url")]
    pub image_file: Option<PathBuf>,
    /// Already hosted image
    #[arg(long, value_name = "URL", requires = "public_id")]
    pub image_url: Option<String>,
    /// Image host identifier of --image-url
    #[arg(long, value_name = "ID", requires = "image_url")]
    pub public_id: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminCmd,
}

#[derive(Subcommand, Debug)]
pub enum AdminCmd {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Password from env only (CLI flag intentionally hidden to avoid shell history leaks)
        #[arg(long = "password-from-env", hide = true, env = "MURALES_ADMIN_PASSWORD")]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in administrator
    Whoami,
    /// Submission counts per status
    Summary,
    /// Submissions in one status
    List {
        #[arg(long, value_enum, default_value_t = StatusArg::Pending)]
        status: StatusArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Approve a submission
    Approve {
        id: String,
        /// Notify the contributor
        #[arg(long)]
        send_email: bool,
        /// Personal note included in the email
        #[arg(long)]
        message: Option<String>,
    },
    /// Reject a submission
    Reject {
        id: String,
        /// At least 10 characters
        #[arg(long)]
        reason: String,
        #[arg(long)]
        send_email: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for MuralStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => MuralStatus::Pending,
            StatusArg::Approved => MuralStatus::Approved,
            StatusArg::Rejected => MuralStatus::Rejected,
        }
    }
}
