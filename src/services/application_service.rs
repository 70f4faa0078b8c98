use chrono::NaiveDate;

use crate::database::models::{
    ApplicationState, ApplicationWithKingdoms, RulerApplication, TransitionActor, User,
};
use crate::database::{ApplicationRepository, DatabaseError};
use crate::filter::ApplicationFilter;

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("application belongs to another user")]
    NotOwner,

    #[error("only a draft application can be edited")]
    NotDraft,

    #[error("cannot change application state from {from} to {to}")]
    InvalidTransition { from: ApplicationState, to: ApplicationState },

    #[error("application has no kingdoms")]
    Empty,

    #[error("date From {from} is after date To {to}")]
    InvertedDates { from: NaiveDate, to: NaiveDate },
}

/// Ownership and lifecycle rules on top of `ApplicationRepository`.
pub struct ApplicationService {
    repo: ApplicationRepository,
}

impl ApplicationService {
    pub fn new(repo: ApplicationRepository) -> Self {
        Self { repo }
    }

    /// Applications the user created, deleted ones excluded.
    pub async fn list_own(&self, user: &User) -> Result<Vec<RulerApplication>, ApplicationError> {
        Ok(self.repo.list_for_user(user.id).await?)
    }

    pub async fn list_all(&self, filter: &ApplicationFilter) -> Result<Vec<RulerApplication>, ApplicationError> {
        Ok(self.repo.list_all(filter).await?)
    }

    /// Readable by its creator and by moderators.
    pub async fn visible(&self, user: &User, id: i32) -> Result<RulerApplication, ApplicationError> {
        let app = self.repo.get(id).await?;
        if app.creator_refer != user.id && !user.role().is_moderator() {
            return Err(ApplicationError::NotOwner);
        }
        Ok(app)
    }

    pub async fn with_kingdoms(&self, user: &User, id: i32) -> Result<ApplicationWithKingdoms, ApplicationError> {
        self.visible(user, id).await?;
        Ok(self.repo.with_kingdoms(id).await?)
    }

    async fn owned(&self, user: &User, id: i32) -> Result<RulerApplication, ApplicationError> {
        let app = self.repo.get(id).await?;
        if app.creator_refer != user.id {
            return Err(ApplicationError::NotOwner);
        }
        Ok(app)
    }

    async fn owned_draft(&self, user: &User, id: i32) -> Result<RulerApplication, ApplicationError> {
        let app = self.owned(user, id).await?;
        if !app.state().is_editable() {
            return Err(ApplicationError::NotDraft);
        }
        Ok(app)
    }

    /// Puts the kingdom into the caller's draft, opening a draft if needed.
    pub async fn create_with_kingdom(
        &self,
        user: &User,
        kingdom_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ApplicationWithKingdoms, ApplicationError> {
        check_dates(from, to)?;
        let draft = self.repo.get_or_create_draft(user.id).await?;
        self.repo.add_kingdom(draft.id, kingdom_id, from, to).await?;
        Ok(self.repo.with_kingdoms(draft.id).await?)
    }

    pub async fn update_ruler(&self, user: &User, id: i32, ruler: &str) -> Result<RulerApplication, ApplicationError> {
        self.owned_draft(user, id).await?;
        Ok(self.repo.update_ruler(id, ruler.trim()).await?)
    }

    pub async fn add_kingdom(
        &self,
        user: &User,
        id: i32,
        kingdom_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ApplicationWithKingdoms, ApplicationError> {
        check_dates(from, to)?;
        self.owned_draft(user, id).await?;
        self.repo.add_kingdom(id, kingdom_id, from, to).await?;
        Ok(self.repo.with_kingdoms(id).await?)
    }

    pub async fn update_kingdom(
        &self,
        user: &User,
        id: i32,
        kingdom_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ApplicationWithKingdoms, ApplicationError> {
        check_dates(from, to)?;
        self.owned_draft(user, id).await?;
        self.repo.update_kingdom(id, kingdom_id, from, to).await?;
        Ok(self.repo.with_kingdoms(id).await?)
    }

    pub async fn remove_kingdom(
        &self,
        user: &User,
        id: i32,
        kingdom_id: i32,
    ) -> Result<ApplicationWithKingdoms, ApplicationError> {
        self.owned_draft(user, id).await?;
        self.repo.remove_kingdom(id, kingdom_id).await?;
        Ok(self.repo.with_kingdoms(id).await?)
    }

    pub async fn delete(&self, user: &User, id: i32) -> Result<(), ApplicationError> {
        self.owned(user, id).await?;
        Ok(self.repo.delete(id).await?)
    }

    /// Creator-side transitions. Submitting an empty draft is refused.
    pub async fn change_state_as_creator(
        &self,
        user: &User,
        id: i32,
        to: ApplicationState,
    ) -> Result<RulerApplication, ApplicationError> {
        let app = self.owned(user, id).await?;
        let from = app.state();
        if !from.can_transition(to, TransitionActor::Creator) {
            return Err(ApplicationError::InvalidTransition { from, to });
        }
        if to == ApplicationState::Submitted && self.repo.kingdom_count(id).await? == 0 {
            return Err(ApplicationError::Empty);
        }
        Ok(self.repo.transition(id, from, to, None).await?)
    }

    pub async fn change_state_as_moderator(
        &self,
        moderator: &User,
        id: i32,
        to: ApplicationState,
    ) -> Result<RulerApplication, ApplicationError> {
        let app = self.repo.get(id).await?;
        let from = app.state();
        if !from.can_transition(to, TransitionActor::Moderator) {
            return Err(ApplicationError::InvalidTransition { from, to });
        }
        Ok(self.repo.transition(id, from, to, Some(moderator.id)).await?)
    }

    /// Verdict reported by the external checker.
    pub async fn record_check(&self, id: i32, checked: bool) -> Result<RulerApplication, ApplicationError> {
        Ok(self.repo.set_check(id, checked).await?)
    }
}

fn check_dates(from: NaiveDate, to: NaiveDate) -> Result<(), ApplicationError> {
    if from > to {
        return Err(ApplicationError::InvertedDates { from, to });
    }
    Ok(())
}
