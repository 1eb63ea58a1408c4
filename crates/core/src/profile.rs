//! Client profile tabs.

use crate::error::ClientError;
use crate::submission::{SubmissionCoordinator, SubmissionState};
use crate::{ClientDirectory, ClientRecord};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProfileTab {
    #[default]
    Overview,
    Sessions,
    Insights,
    Edit,
}

impl ProfileTab {
    pub const ALL: [ProfileTab; 4] = [
        ProfileTab::Overview,
        ProfileTab::Sessions,
        ProfileTab::Insights,
        ProfileTab::Edit,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ProfileTab::Overview => "overview",
            ProfileTab::Sessions => "sessions",
            ProfileTab::Insights => "insights",
            ProfileTab::Edit => "edit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileTab::Overview => "Overview",
            ProfileTab::Sessions => "Sessions",
            ProfileTab::Insights => "AI Insights",
            ProfileTab::Edit => "Edit Profile",
        }
    }
}

impl fmt::Display for ProfileTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProfileTab {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileTab::ALL
            .into_iter()
            .find(|tab| tab.id() == s)
            .ok_or_else(|| ClientError::InvalidInput(format!("unknown profile tab: {s}")))
    }
}

/// One client's profile page: the active tab plus the edit workflow behind the `Edit` tab.
#[derive(Clone, Debug)]
pub struct ProfileView {
    active_tab: ProfileTab,
    coordinator: SubmissionCoordinator,
}

impl ProfileView {
    pub fn new(record: ClientRecord) -> Self {
        Self {
            active_tab: ProfileTab::Overview,
            coordinator: SubmissionCoordinator::for_record(record),
        }
    }

    pub fn active_tab(&self) -> ProfileTab {
        self.active_tab
    }

    pub fn record(&self) -> Option<&ClientRecord> {
        self.coordinator.record()
    }

    pub fn coordinator(&self) -> &SubmissionCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut SubmissionCoordinator {
        &mut self.coordinator
    }

    /// Switches tabs. Selecting `Edit` puts the form into edit mode.
    pub fn select_tab(&mut self, tab: ProfileTab) {
        if tab == ProfileTab::Edit {
            self.coordinator.begin_edit();
        }
        self.active_tab = tab;
    }

    /// Abandons the edit and returns to the overview. Ignored while a submit is in flight.
    pub fn cancel_edit(&mut self) {
        if self.coordinator.state() == SubmissionState::Submitting {
            return;
        }
        self.coordinator.cancel();
        self.active_tab = ProfileTab::Overview;
    }

    /// Submits the edit form; once saved the view returns to the overview.
    pub async fn submit<D>(&mut self, directory: &D) -> SubmissionState
    where
        D: ClientDirectory + ?Sized,
    {
        let state = self.coordinator.submit(directory).await;
        if state == SubmissionState::Success {
            self.active_tab = ProfileTab::Overview;
        }
        state
    }
}
