use agrihub_types::api::{ForumPostPatch, NewForumPost, NewForumReply};
use agrihub_types::models::{ForumPost, ForumReply};
use agrihub_types::{Actor, Envelope};
use tracing::info;

use crate::error::DbError;
use crate::query::{Embed, Query};
use crate::schema::{FORUM_REPLIES, FORUMS, OWNER_COLUMN, REPLY_COLUMNS};
use crate::{Database, Owned, finish, first_row};

const POST_GONE: &str = "Post not found or insufficient permissions";
const REPLY_GONE: &str = "Reply not found or insufficient permissions";

fn with_replies() -> Embed {
    Embed::children(FORUM_REPLIES, "forum_id", REPLY_COLUMNS)
}

impl Database {
    // -- Posts --

    /// Every post, newest first, with its replies embedded.
    pub async fn list_posts(&self) -> Envelope<Vec<ForumPost>> {
        let query = Query::table(FORUMS).embed(with_replies()).newest_first();
        finish("fetching posts", self.fetch(&query).await)
    }

    pub async fn create_post(&self, actor: &Actor, post: &NewForumPost) -> Envelope<ForumPost> {
        self.set_user_context(actor).await;
        let body = Owned::named(actor, post);
        let result: Result<ForumPost, DbError> =
            self.insert_one(&Query::table(FORUMS), &body).await;
        if let Ok(created) = &result {
            info!(post = created.id, user = %actor.id, "Post created");
        }
        finish("creating post", result)
    }

    /// One post with its replies. Fails unless exactly one row matches.
    pub async fn get_post(&self, post_id: i64) -> Envelope<ForumPost> {
        let result = self.fetch_post(post_id).await.and_then(|post| {
            post.ok_or_else(|| DbError::NotFound(format!("Post {post_id} not found")))
        });
        finish("fetching post", result)
    }

    /// Like [`Database::get_post`], but a missing post is `None` rather
    /// than a failure.
    pub async fn find_post(&self, post_id: i64) -> Envelope<Option<ForumPost>> {
        finish("fetching post", self.fetch_post(post_id).await)
    }

    async fn fetch_post(&self, post_id: i64) -> Result<Option<ForumPost>, DbError> {
        let query = Query::table(FORUMS).embed(with_replies()).eq("id", post_id);
        self.fetch_one(&query).await
    }

    /// Apply `patch` to a post owned by `actor`.
    pub async fn update_post(
        &self,
        post_id: i64,
        patch: &ForumPostPatch,
        actor: &Actor,
    ) -> Envelope<ForumPost> {
        if patch.is_empty() {
            return finish("updating post", Err(DbError::EmptyUpdate));
        }
        self.set_user_context(actor).await;

        let query = Query::table(FORUMS)
            .eq("id", post_id)
            .eq(OWNER_COLUMN, actor.id.as_str());
        let result = match serde_json::to_value(patch) {
            Ok(patch) => self.store.update(&query, patch).await,
            Err(e) => Err(e.into()),
        }
        .and_then(|rows| {
            if rows.is_empty() {
                Err(DbError::NotFound(POST_GONE.to_string()))
            } else {
                first_row(rows)
            }
        });
        finish("updating post", result)
    }

    /// Delete a post owned by `actor`. Replies go first; if that fails the
    /// post is left alone.
    pub async fn delete_post(&self, post_id: i64, actor: &Actor) -> Envelope<()> {
        self.set_user_context(actor).await;

        let replies = Query::table(FORUM_REPLIES).eq("forum_id", post_id);
        let removed = match self.store.delete(&replies).await {
            Ok(rows) => rows.len(),
            Err(e) => return finish("deleting replies", Err(e)),
        };

        let post = Query::table(FORUMS)
            .eq("id", post_id)
            .eq(OWNER_COLUMN, actor.id.as_str());
        let result = self.store.delete(&post).await.and_then(|rows| {
            if rows.is_empty() {
                Err(DbError::NotFound(POST_GONE.to_string()))
            } else {
                Ok(())
            }
        });
        if result.is_ok() {
            info!(post = post_id, replies = removed, user = %actor.id, "Post deleted");
        }
        finish("deleting post", result)
    }

    // -- Replies --

    pub async fn add_reply(&self, actor: &Actor, reply: &NewForumReply) -> Envelope<ForumReply> {
        self.set_user_context(actor).await;
        let body = Owned::named(actor, reply);
        let result = self.insert_one(&Query::table(FORUM_REPLIES), &body).await;
        finish("adding reply", result)
    }

    /// Delete a reply owned by `actor`. Zero matching rows is a failure.
    pub async fn delete_reply(&self, reply_id: i64, actor: &Actor) -> Envelope<()> {
        self.set_user_context(actor).await;
        let query = Query::table(FORUM_REPLIES)
            .eq("id", reply_id)
            .eq(OWNER_COLUMN, actor.id.as_str());
        let result = self.store.delete(&query).await.and_then(|rows| {
            if rows.is_empty() {
                Err(DbError::NotFound(REPLY_GONE.to_string()))
            } else {
                Ok(())
            }
        });
        finish("deleting reply", result)
    }
}
