use std::path::PathBuf;

use aula_core::{Modality, ProposalDecision};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "aula")]
#[command(about = "Client for the Aula academic portal")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the profile
    Login {
        email: String,
        password: String,
    },
    /// Sign out and forget the profile
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Summary counters for the signed-in role
    Summary,

    /// List topics and their free slots
    Topics {
        /// Include topics of other careers
        #[arg(long)]
        all: bool,
    },
    /// Reserve a slot on a topic
    Reserve { topic: i64 },
    /// Set the companions on a topic you hold a slot on
    Companions {
        topic: i64,
        emails: Vec<String>,
    },
    /// Publish a topic (teacher or coordination)
    PublishTopic {
        #[arg(long)]
        title: String,
        #[arg(long)]
        career: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "requirement")]
        requirements: Vec<String>,
        #[arg(long, default_value_t = 1)]
        slots: u32,
    },
    /// Delete a topic (teacher or coordination)
    DeleteTopic { topic: i64 },

    /// List teachers, optionally those covering one branch
    Teachers {
        #[arg(long)]
        branch: Option<String>,
    },
    /// List proposals for the signed-in role
    Proposals,
    /// Submit a proposal
    Propose {
        #[arg(long)]
        title: String,
        #[arg(long)]
        objective: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        branch: String,
        /// Teacher id, most preferred first (up to three)
        #[arg(long = "teacher", num_args = 1..=3)]
        teachers: Vec<String>,
        #[arg(long, default_value_t = 1)]
        slots: u32,
        /// Classmate to include (needs more than one slot)
        #[arg(long = "peer")]
        peers: Vec<String>,
    },
    /// Decide on a proposal (teacher)
    Decide {
        proposal: i64,
        #[arg(value_enum)]
        action: DecisionAction,
        #[arg(long)]
        comment: String,
        /// Authorized slots, for `adjust`
        #[arg(long)]
        slots: Option<u32>,
    },
    /// Delete a proposal (teacher or coordination)
    DeleteProposal { proposal: i64 },

    /// List meeting requests
    Requests,
    /// Ask your guide teacher for a meeting (student)
    RequestMeeting {
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "")]
        availability: String,
    },
    /// Approve a meeting request, scheduling it (teacher)
    ApproveRequest {
        request: i64,
        #[command(flatten)]
        slot: SlotArgs,
    },
    /// Reject a meeting request (teacher)
    RejectRequest {
        request: i64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// List meetings
    Meetings,
    /// Schedule a meeting without a request (teacher)
    Schedule {
        #[arg(long)]
        student: i64,
        #[arg(long)]
        reason: String,
        #[command(flatten)]
        slot: SlotArgs,
    },
    /// Close a meeting (teacher)
    CloseMeeting {
        meeting: i64,
        #[arg(value_enum)]
        outcome: OutcomeArg,
        #[arg(long)]
        comment: Option<String>,
    },

    /// List notifications
    Notifications {
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification read, or all of them
    Read {
        #[arg(required_unless_present = "all")]
        notification: Option<i64>,
        #[arg(long)]
        all: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct SlotArgs {
    /// Date as YYYY-MM-DD
    #[arg(long)]
    pub date: NaiveDate,
    /// Start time as HH:MM
    #[arg(long, value_parser = parse_time)]
    pub start: NaiveTime,
    /// End time as HH:MM
    #[arg(long, value_parser = parse_time)]
    pub end: NaiveTime,
    /// presencial, online, or another modality
    #[arg(long, default_value = "presencial", value_parser = parse_modality)]
    pub modality: Modality,
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Adjust,
    Reject,
}

impl DecisionAction {
    pub fn into_decision(self, comment: String, slots: Option<u32>) -> ProposalDecision {
        match self {
            DecisionAction::Approve => ProposalDecision::ApproveFinal { comment },
            DecisionAction::Reject => ProposalDecision::Reject { comment },
            DecisionAction::Adjust => ProposalDecision::RequestAdjustment {
                authorized_slots: slots.unwrap_or(0),
                comment,
            },
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeArg {
    Finalized,
    NotHeld,
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    aula_net::protocol::parse_wire_time(raw).ok_or_else(|| format!("'{raw}' is not a HH:MM time"))
}

fn parse_modality(raw: &str) -> Result<Modality, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("modality cannot be empty".to_string());
    }
    Ok(Modality::from_tag(raw))
}
