//! Identity, profiles and the follow relation.

use domains::ports::StoreTx;
use domains::{AppError, Result, User, UserId, UserProfile};
use rand::seq::IndexedRandom;
use tracing::{debug, info, instrument};

use crate::{MicroblogService, NAMES};

impl MicroblogService {
    /// Resolves the user owning `api_key`. Exact, case-sensitive match with
    /// no fallback to a guest identity.
    #[instrument(skip_all)]
    pub async fn identify(&self, api_key: &str) -> Result<User> {
        if api_key.is_empty() {
            return Err(AppError::MissingCredential);
        }
        let mut tx = self.store.begin().await?;
        tx.user_by_api_key(api_key)
            .await?
            .ok_or(AppError::UnknownCredential)
    }

    /// Returns the user owning `api_key`, creating it with a random display
    /// name if the key has never been seen.
    #[instrument(skip_all)]
    pub async fn get_or_create_user(&self, api_key: &str) -> Result<User> {
        let mut tx = self.store.begin_write().await?;
        let user = find_or_insert(&mut *tx, api_key).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// The "whoami" path: get-or-create plus the caller's profile, read in
    /// the same transaction.
    #[instrument(skip_all)]
    pub async fn me(&self, api_key: &str) -> Result<UserProfile> {
        let mut tx = self.store.begin_write().await?;
        let user = find_or_insert(&mut *tx, api_key).await?;
        let profile = load_profile(&mut *tx, user).await?;
        tx.commit().await?;
        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn user_profile(&self, id: UserId) -> Result<UserProfile> {
        let mut tx = self.store.begin().await?;
        let user = tx
            .user_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))?;
        load_profile(&mut *tx, user).await
    }

    /// Adds `target` to the follower's `following` set. Following twice is a
    /// no-op.
    #[instrument(skip(self, follower), fields(follower_id = follower.id))]
    pub async fn follow_user(&self, follower: &User, target: UserId) -> Result<()> {
        if follower.id == target {
            return Err(AppError::ValidationError(
                "users cannot follow themselves".into(),
            ));
        }

        let mut tx = self.store.begin_write().await?;
        if tx.user_by_id(target).await?.is_none() {
            return Err(AppError::not_found("User", target));
        }
        if tx.insert_follow(follower.id, target).await? {
            info!("follow created");
        } else {
            debug!("already following");
        }
        tx.commit().await?;
        Ok(())
    }

    /// Removes `target` from the follower's `following` set. Removing a
    /// relation that does not exist is an error.
    #[instrument(skip(self, follower), fields(follower_id = follower.id))]
    pub async fn unfollow_user(&self, follower: &User, target: UserId) -> Result<()> {
        let mut tx = self.store.begin_write().await?;
        if !tx.delete_follow(follower.id, target).await? {
            return Err(AppError::not_found(
                "Follow",
                format!("{}->{}", follower.id, target),
            ));
        }
        tx.commit().await?;
        info!("follow removed");
        Ok(())
    }
}

async fn find_or_insert(tx: &mut dyn StoreTx, api_key: &str) -> Result<User> {
    if api_key.is_empty() {
        return Err(AppError::MissingCredential);
    }
    if let Some(user) = tx.user_by_api_key(api_key).await? {
        return Ok(user);
    }
    let user = tx.insert_user(pick_name(), api_key).await?;
    info!(user_id = user.id, name = %user.name, "user created");
    Ok(user)
}

async fn load_profile(tx: &mut dyn StoreTx, user: User) -> Result<UserProfile> {
    let followers = tx.followers_of(user.id).await?;
    let following = tx.following_of(user.id).await?;
    Ok(UserProfile {
        id: user.id,
        name: user.name,
        followers,
        following,
    })
}

fn pick_name() -> &'static str {
    NAMES.choose(&mut rand::rng()).copied().unwrap_or("Anonymous")
}
