//! Profile edits

use log::info;

use super::busy::BusyFlag;
use crate::auth::MessageResponse;
use crate::error::Result;
use crate::sync::{ProfileSnapshot, ProfileSync};
use crate::user::{ChangePasswordRequest, ProfileUpdate, UserClient};

#[derive(Clone)]
pub struct ProfileEditor {
    user: UserClient,
    sync: ProfileSync,
    busy: BusyFlag,
}

impl ProfileEditor {
    pub fn new(user: UserClient, sync: ProfileSync) -> Self {
        Self {
            user,
            sync,
            busy: BusyFlag::new("Profile update"),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.busy.is_busy()
    }

    /// Save the edited fields, then reload the profile so the stored copy
    /// matches the server
    pub async fn save(&self, update: &ProfileUpdate) -> Result<ProfileSnapshot> {
        let _guard = self.busy.acquire()?;
        let saved = self.user.update_profile(update).await?;
        info!("Profile {} updated", saved.id);
        Ok(self.sync.refresh().await)
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<MessageResponse> {
        let _guard = self.busy.acquire()?;
        self.user.change_password(request).await
    }
}
