//! Merges conversation history with the rating and favorite tables into render flags.

use std::collections::HashMap;
use std::sync::Arc;

use dcommon::ImageRef;

use crate::{
    DesignApi, FavoriteRecord, FavoriteState, Message, RatingRecord, RatingState,
    RenderedMessage,
};

/// Side tables keyed by image reference. A missing key means "no rating yet" or
/// "not favorited".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideState {
    pub ratings: HashMap<ImageRef, RatingRecord>,
    pub favorites: HashMap<ImageRef, FavoriteRecord>,
}

impl SideState {
    pub fn from_records(ratings: Vec<RatingRecord>, favorites: Vec<FavoriteRecord>) -> Self {
        Self {
            ratings: ratings
                .into_iter()
                .map(|record| (record.image_ref.clone(), record))
                .collect(),
            favorites: favorites
                .into_iter()
                .map(|record| (record.image_ref.clone(), record))
                .collect(),
        }
    }

    pub fn rating_state(&self, image_ref: &ImageRef) -> RatingState {
        RatingState::from_record(self.ratings.get(image_ref))
    }

    pub fn favorite_state(&self, image_ref: &ImageRef) -> FavoriteState {
        match self.favorites.get(image_ref) {
            Some(record) => FavoriteState::Favorited(record.favorite_id.clone()),
            None => FavoriteState::NotFavorited,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateReconciler {
    api: Arc<DesignApi>,
}

impl StateReconciler {
    pub fn new(api: Arc<DesignApi>) -> Self {
        Self { api }
    }

    /// Fetches ratings and favorites concurrently; either table degrades to empty on failure.
    pub async fn fetch_side_state(&self) -> SideState {
        let (ratings, favorites) =
            futures_util::join!(self.api.list_ratings(), self.api.list_favorites());

        let ratings = ratings.unwrap_or_else(|error| {
            tracing::warn!(
                phase = "reconciler",
                event = "ratings_unavailable",
                error = %error,
            );
            Vec::new()
        });
        let favorites = favorites.unwrap_or_else(|error| {
            tracing::warn!(
                phase = "reconciler",
                event = "favorites_unavailable",
                error = %error,
            );
            Vec::new()
        });

        SideState::from_records(ratings, favorites)
    }

    pub async fn load(&self, messages: Vec<Message>) -> Vec<RenderedMessage> {
        let side = self.fetch_side_state().await;
        Self::reconcile(messages, &side)
    }

    pub fn reconcile(messages: Vec<Message>, side: &SideState) -> Vec<RenderedMessage> {
        messages
            .into_iter()
            .map(|message| Self::render(message, side))
            .collect()
    }

    pub fn render(message: Message, side: &SideState) -> RenderedMessage {
        let Some(image_ref) = message.image_ref.clone() else {
            return RenderedMessage::plain(message);
        };

        RenderedMessage {
            rating: Some(side.rating_state(&image_ref)),
            favorite: Some(side.favorite_state(&image_ref)),
            ..RenderedMessage::plain(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RatingScores, Role};

    fn image(id: &str, image_ref: &str) -> Message {
        Message::new(id, Role::Assistant, "result").with_image(ImageRef::from(image_ref))
    }

    #[test]
    fn flags_follow_side_tables() {
        let side = SideState::from_records(
            vec![
                RatingRecord {
                    image_ref: ImageRef::from("/a.png"),
                    scores: RatingScores::new(5, 4, 4),
                    style_tag: Some("retro".to_string()),
                },
                RatingRecord {
                    image_ref: ImageRef::from("/b.png"),
                    scores: RatingScores::new(5, 0, 4),
                    style_tag: None,
                },
            ],
            vec![FavoriteRecord {
                favorite_id: "f-1".into(),
                image_ref: ImageRef::from("/b.png"),
                prompt: "crane".to_string(),
                style_name: None,
            }],
        );

        let rendered = StateReconciler::reconcile(
            vec![
                Message::new("u-1", Role::User, "draw a crane"),
                image("m-1", "/a.png"),
                image("m-2", "/b.png"),
                image("m-3", "/c.png"),
            ],
            &side,
        );

        assert_eq!(rendered[0].rating, None);
        assert_eq!(rendered[0].favorite, None);

        assert!(rendered[1].rating.as_ref().is_some_and(RatingState::is_submitted));
        assert_eq!(rendered[1].favorite, Some(FavoriteState::NotFavorited));

        assert_eq!(
            rendered[2].rating,
            Some(RatingState::NotSubmitted {
                prefill: Some(RatingScores::new(5, 0, 4))
            })
        );
        assert_eq!(
            rendered[2].favorite,
            Some(FavoriteState::Favorited("f-1".into()))
        );

        assert_eq!(
            rendered[3].rating,
            Some(RatingState::NotSubmitted { prefill: None })
        );
    }

    #[test]
    fn empty_side_state_leaves_every_image_unrated_and_unfavorited() {
        let rendered =
            StateReconciler::reconcile(vec![image("m-1", "/a.png")], &SideState::default());
        assert!(rendered[0].rating.as_ref().is_some_and(RatingState::submit_enabled));
        assert_eq!(rendered[0].favorite, Some(FavoriteState::NotFavorited));
    }
}
