use diesel::dsl::count_star;
use diesel::{BoolExpressionMethods, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl};

use crate::diesel::RunQueryDsl;
use crate::errors::ApiError;
use crate::models::{Channel, NewSubscription, Subscription, User};
use crate::schema::channels::dsl::channels;
use crate::schema::subscriptions::dsl::subscriptions;

pub fn get_channel_by_id(db: &PgConnection, target_channel_id: i32) -> Result<Channel, ApiError> {
    channels
        .find(target_channel_id)
        .first::<Channel>(db)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("channel {} not found", target_channel_id)))
}

/// Registration creates the channel with the user, so a missing channel here
/// means the account predates the schema or was tampered with.
pub fn channel_for_user(db: &PgConnection, owner_user_id: i32) -> Result<Channel, ApiError> {
    channels
        .filter(crate::schema::channels::user_id.eq(owner_user_id))
        .first::<Channel>(db)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("no channel for user {}", owner_user_id)))
}

fn find_edge(db: &PgConnection, subscriber_id: i32, target_id: i32) -> Result<Option<Subscription>, ApiError> {
    let edge = subscriptions
        .filter(
            crate::schema::subscriptions::subscriber_channel_id
                .eq(subscriber_id)
                .and(crate::schema::subscriptions::channel_id.eq(target_id)),
        )
        .first::<Subscription>(db)
        .optional()?;

    Ok(edge)
}

pub fn subscribe(db: &PgConnection, actor: &User, target_channel_id: i32) -> Result<(), ApiError> {
    let own_channel = channel_for_user(db, actor.id)?;
    let target_channel = get_channel_by_id(db, target_channel_id)?;

    if own_channel.id == target_channel.id {
        return Err(ApiError::InvalidOperation(String::from(
            "cannot subscribe to your own channel",
        )));
    }

    if find_edge(db, own_channel.id, target_channel.id)?.is_some() {
        return Err(ApiError::Conflict(String::from("already subscribed to this channel")));
    }

    let new_edge = NewSubscription {
        subscriber_channel_id: own_channel.id,
        channel_id: target_channel.id,
    };

    // The UNIQUE (subscriber, target) pair turns a concurrent duplicate
    // insert into a Conflict via the From<diesel::result::Error> mapping.
    diesel::insert_into(subscriptions).values(&new_edge).execute(db)?;

    Ok(())
}

pub fn unsubscribe(db: &PgConnection, actor: &User, target_channel_id: i32) -> Result<(), ApiError> {
    let own_channel = channel_for_user(db, actor.id)?;
    let target_channel = get_channel_by_id(db, target_channel_id)?;

    let edge = find_edge(db, own_channel.id, target_channel.id)?
        .ok_or_else(|| ApiError::NotFound(String::from("subscription not found")))?;

    diesel::delete(subscriptions.find(edge.id)).execute(db)?;

    Ok(())
}

pub fn is_subscribed(db: &PgConnection, actor: &User, target_channel_id: i32) -> Result<bool, ApiError> {
    let own_channel = match channel_for_user(db, actor.id) {
        Ok(channel) => channel,
        Err(ApiError::NotFound(_)) => return Ok(false),
        Err(other) => return Err(other),
    };

    let target_channel = get_channel_by_id(db, target_channel_id)?;

    Ok(find_edge(db, own_channel.id, target_channel.id)?.is_some())
}

pub fn subscriber_count(db: &PgConnection, target_channel_id: i32) -> Result<i64, ApiError> {
    let target_channel = get_channel_by_id(db, target_channel_id)?;

    let count: i64 = subscriptions
        .filter(crate::schema::subscriptions::channel_id.eq(target_channel.id))
        .select(count_star())
        .first(db)?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connect, create_user};

    #[test]
    #[ignore] // needs a migrated postgres at TEST_DATABASE_URL / DATABASE_URL
    fn self_subscription_is_rejected() {
        let db = connect();
        let (user, channel) = create_user(&db);

        match subscribe(&db, &user, channel.id) {
            Err(ApiError::InvalidOperation(_)) => (),
            other => panic!("expected InvalidOperation, got {:?}", other.err()),
        }
    }

    #[test]
    #[ignore]
    fn subscribe_unsubscribe_lifecycle() {
        let db = connect();
        let (subscriber, _) = create_user(&db);
        let (_, target) = create_user(&db);

        assert_eq!(subscriber_count(&db, target.id).unwrap(), 0);
        assert_eq!(is_subscribed(&db, &subscriber, target.id).unwrap(), false);

        subscribe(&db, &subscriber, target.id).unwrap();
        assert_eq!(subscriber_count(&db, target.id).unwrap(), 1);
        assert_eq!(is_subscribed(&db, &subscriber, target.id).unwrap(), true);

        match subscribe(&db, &subscriber, target.id) {
            Err(ApiError::Conflict(_)) => (),
            other => panic!("expected Conflict, got {:?}", other.err()),
        }

        unsubscribe(&db, &subscriber, target.id).unwrap();
        assert_eq!(subscriber_count(&db, target.id).unwrap(), 0);

        match unsubscribe(&db, &subscriber, target.id) {
            Err(ApiError::NotFound(_)) => (),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    #[ignore]
    fn subscriber_count_for_missing_channel_is_not_found() {
        let db = connect();
        match subscriber_count(&db, -1) {
            Err(ApiError::NotFound(_)) => (),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }
}
