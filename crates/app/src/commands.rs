//! Command dispatch
//!
//! Each command drives one view model the way a screen would: activate,
//! act, then print what the store holds.

use aula_core::{
    Meeting, MeetingId, MeetingOutcome, MeetingRequest, MeetingRequestForm, MeetingRequestId,
    NotificationId, Proposal, ProposalForm, ProposalId, Role, Topic, TopicForm, TopicId, UserId,
};
use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::cli::{Command, OutcomeArg, SlotArgs};
use crate::error::Result;
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::viewmodel::{
    AuthViewModel, DashboardViewModel, DeskViewModel, MeetingsViewModel, NotificationsViewModel,
    SlotForm, TopicsViewModel,
};

/// Close `scope` when the user interrupts
fn close_on_interrupt(scope: &ViewScope) {
    let closer = scope.closer();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, closing view");
            closer.cancel();
        }
    });
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl From<SlotArgs> for SlotForm {
    fn from(args: SlotArgs) -> Self {
        Self {
            date: args.date,
            start: args.start,
            end: args.end,
            modality: args.modality,
            comment: args.comment,
        }
    }
}

impl From<OutcomeArg> for MeetingOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Finalized => MeetingOutcome::Finalized,
            OutcomeArg::NotHeld => MeetingOutcome::NotHeld,
        }
    }
}

pub async fn run(command: Command, state: AppState) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let vm = AuthViewModel::new(state);
            close_on_interrupt(vm.scope());
            let profile = vm.login(&email, &password).await?;
            println!("Signed in as {} ({})", profile.name, profile.role);
        }
        Command::Logout => {
            AuthViewModel::new(state).logout().await?;
            println!("Signed out");
        }
        Command::Whoami => {
            let profile = state.session.require()?;
            println!("{} <{}>", profile.name, profile.email);
            println!("  role:   {}", profile.role);
            if let Some(career) = &profile.career {
                println!("  career: {career}");
            }
        }
        Command::Summary => summary(state).await?,

        Command::Topics { all } => {
            let vm = TopicsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let topics = if all {
                vm.topics().snapshot()
            } else {
                vm.visible_topics()
            };
            for topic in topics {
                let availability = vm.availability(&topic)?;
                print_topic(&topic);
                println!("      {availability:?}");
            }
        }
        Command::Reserve { topic } => {
            let vm = TopicsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let topic = vm.reserve(TopicId(topic)).await?;
            println!("Reserved a slot on \"{}\"", topic.title);
            print_topic(&topic);
        }
        Command::Companions { topic, emails } => {
            let vm = TopicsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let topic = vm.assign_companions(TopicId(topic), &emails).await?;
            print_topic(&topic);
            for email in vm.current_companions(topic.id) {
                println!("      companion {email}");
            }
        }
        Command::PublishTopic {
            title,
            career,
            description,
            requirements,
            slots,
        } => {
            let vm = DeskViewModel::new(state);
            close_on_interrupt(vm.scope());
            let form = TopicForm {
                title,
                career,
                description,
                requirements,
                total_slots: slots,
            };
            let topic = vm.publish_topic(&form).await?;
            println!("Published topic {}", topic.id);
        }
        Command::DeleteTopic { topic } => {
            let vm = DeskViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.delete_topic(TopicId(topic)).await?;
            println!("Deleted topic {topic}");
        }

        Command::Teachers { branch } => {
            let vm = TopicsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            for teacher in vm.teacher_choices(branch.as_deref().unwrap_or_default()) {
                let branches = teacher.branches.as_deref().unwrap_or_default().join(", ");
                println!("{:>5}  {:<30} {}", teacher.id.0, teacher.name, branches);
            }
        }
        Command::Proposals => proposals(state).await?,
        Command::Propose {
            title,
            objective,
            description,
            branch,
            teachers,
            slots,
            peers,
        } => {
            let vm = TopicsViewModel::new(state);
            close_on_interrupt(vm.scope());
            let form = ProposalForm {
                title,
                objective,
                description,
                branch,
                preferences: teachers,
                requested_slots: slots,
                peer_emails: peers,
            };
            let proposal = vm.submit_proposal(&form).await?;
            println!("Submitted proposal {}", proposal.id);
            print_proposal(&proposal);
        }
        Command::Decide {
            proposal,
            action,
            comment,
            slots,
        } => {
            let vm = DeskViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let decision = action.into_decision(comment, slots);
            let proposal = vm.decide(ProposalId(proposal), decision).await?;
            print_proposal(&proposal);
        }
        Command::DeleteProposal { proposal } => {
            let vm = DeskViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.delete_proposal(ProposalId(proposal)).await?;
            println!("Deleted proposal {proposal}");
        }

        Command::Requests => {
            let vm = MeetingsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let (pending, resolved) = vm.split_requests();
            println!("Pending");
            pending.iter().for_each(|r| print_request(r));
            println!("Resolved");
            resolved.iter().for_each(|r| print_request(r));
        }
        Command::RequestMeeting {
            reason,
            availability,
        } => {
            let vm = MeetingsViewModel::new(state);
            close_on_interrupt(vm.scope());
            let form = MeetingRequestForm {
                reason,
                availability,
            };
            let request = vm.request_meeting(&form).await?;
            println!("Requested meeting {}", request.id);
        }
        Command::ApproveRequest { request, slot } => {
            let slot = SlotForm::from(slot);
            let vm = MeetingsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let meeting = vm.approve(MeetingRequestId(request), &slot).await?;
            print_meeting(&meeting);
        }
        Command::RejectRequest { request, comment } => {
            let vm = MeetingsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let request = vm
                .reject(MeetingRequestId(request), comment.as_deref())
                .await?;
            print_request(&request);
        }
        Command::Meetings => {
            let vm = MeetingsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let (upcoming, past) = vm.split_meetings(today());
            println!("Upcoming");
            upcoming.iter().for_each(|m| print_meeting(m));
            println!("Past");
            past.iter().for_each(|m| print_meeting(m));
        }
        Command::Schedule {
            student,
            reason,
            slot,
        } => {
            let vm = MeetingsViewModel::new(state);
            close_on_interrupt(vm.scope());
            let meeting = vm
                .schedule(UserId(student), &reason, &SlotForm::from(slot))
                .await?;
            print_meeting(&meeting);
        }
        Command::CloseMeeting {
            meeting,
            outcome,
            comment,
        } => {
            let vm = MeetingsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let meeting = vm
                .close(MeetingId(meeting), outcome.into(), comment.as_deref())
                .await?;
            print_meeting(&meeting);
        }

        Command::Notifications { unread } => {
            let vm = NotificationsViewModel::new(state);
            close_on_interrupt(vm.scope());
            vm.activate().await?;
            let list = if unread {
                vm.unread()
            } else {
                vm.notifications().snapshot()
            };
            for n in list {
                let mark = if n.read { ' ' } else { '*' };
                println!("{mark} {:>5}  {}  {}", n.id.0, n.created_at.format("%Y-%m-%d"), n.title);
                if !n.message.is_empty() {
                    println!("         {}", n.message);
                }
            }
            println!("{} unread", vm.unread_count());
        }
        Command::Read { notification, all } => {
            let vm = NotificationsViewModel::new(state);
            close_on_interrupt(vm.scope());
            if all {
                vm.activate().await?;
                let changed = vm.mark_all_read().await?;
                println!("Marked {changed} notifications read");
            } else if let Some(id) = notification {
                vm.mark_read(NotificationId(id)).await?;
                println!("Marked notification {id} read");
            }
        }
    }
    Ok(())
}

async fn summary(state: AppState) -> Result<()> {
    let role = state.session.require()?.role;
    let vm = DashboardViewModel::new(state);
    close_on_interrupt(vm.scope());
    vm.activate().await?;

    let today = today();
    let summary = vm.summary(today);
    println!(
        "Proposals     {} pending, {} accepted, {} rejected",
        summary.proposals_pending, summary.proposals_accepted, summary.proposals_rejected
    );
    println!("Requests      {} pending", summary.requests_pending);
    println!("Meetings      {} upcoming", summary.meetings_upcoming);
    println!("Notifications {} unread", summary.notifications_unread);

    if role == Role::Student {
        if let Some(featured) = vm.featured_proposal() {
            println!();
            print_proposal(&featured);
        }
    }
    if let Some(next) = vm.next_meeting(today) {
        println!();
        println!("Next meeting");
        print_meeting(&next);
    }
    Ok(())
}

async fn proposals(state: AppState) -> Result<()> {
    if state.session.require()?.role == Role::Student {
        let vm = TopicsViewModel::new(state);
        close_on_interrupt(vm.scope());
        vm.activate().await?;
        if let Some(featured) = vm.featured_proposal() {
            println!("Current");
            print_proposal(&featured);
        }
        println!("History");
        vm.proposal_history().iter().for_each(|p| print_proposal(p));
    } else {
        let vm = DeskViewModel::new(state);
        close_on_interrupt(vm.scope());
        vm.activate().await?;
        println!("Awaiting decision");
        vm.pending().iter().for_each(|p| print_proposal(p));
    }
    Ok(())
}

fn print_topic(topic: &Topic) {
    println!(
        "{:>5}  {:<40} {}/{} free  {}",
        topic.id.0, topic.title, topic.available_slots, topic.total_slots, topic.career
    );
    if let Some(guide) = topic.guide() {
        println!("      guide: {}", guide.name);
    }
}

fn print_proposal(p: &Proposal) {
    println!("{:>5}  {:<40} {}", p.id.0, p.title, p.state);
    println!(
        "      branch {}, slots {} (updated {})",
        p.branch,
        p.effective_slots(),
        p.updated_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(comment) = &p.decision_comment {
        println!("      \"{comment}\"");
    }
}

fn print_request(r: &MeetingRequest) {
    let student = r.student.as_ref().map(|s| s.name.as_str()).unwrap_or("-");
    println!(
        "{:>5}  {:<10} {:<25} {}",
        r.id.0,
        r.state.to_string(),
        student,
        r.reason
    );
}

fn print_meeting(m: &Meeting) {
    println!(
        "{:>5}  {} {}-{}  {:<10} {}  {}",
        m.id.0,
        m.date,
        m.start.format("%H:%M"),
        m.end.format("%H:%M"),
        m.state.to_string(),
        m.modality.as_tag(),
        m.reason
    );
}
