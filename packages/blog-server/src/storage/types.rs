use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for users
pub type UserId = Uuid;

/// Blog post with its author, co-authors and likers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    /// Ordered, duplicate-free
    pub co_authors: Vec<UserId>,
    /// Users who currently like this blog, duplicate-free
    pub likes: Vec<UserId>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Blog {
    /// Check if a user wrote this blog
    pub fn is_author(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    /// Check if a user is listed as a co-author
    pub fn is_co_author(&self, user_id: UserId) -> bool {
        self.co_authors.contains(&user_id)
    }

    /// Flip the user's membership in the likers set.
    /// Returns true if the user likes the blog afterwards.
    pub fn toggle_like(&mut self, user_id: UserId) -> bool {
        if let Some(pos) = self.likes.iter().position(|id| *id == user_id) {
            self.likes.remove(pos);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }

    /// Append co-authors that are not already present.
    /// The author is never recorded as their own co-author.
    pub fn add_co_authors(&mut self, user_ids: impl IntoIterator<Item = UserId>) {
        for user_id in user_ids {
            if user_id != self.author_id && !self.co_authors.contains(&user_id) {
                self.co_authors.push(user_id);
            }
        }
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

/// Blog creation request
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub co_authors: Vec<UserId>,
}

/// Comment left on a blog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub user_id: UserId,
    pub blog_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comment creation request
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub user_id: UserId,
    pub blog_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog(author_id: UserId) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            title: "Title".to_string(),
            content: "Content".to_string(),
            author_id,
            co_authors: Vec::new(),
            likes: Vec::new(),
            view_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_toggle_like_twice_restores_count() {
        let mut blog = blog(Uuid::new_v4());
        let reader = Uuid::new_v4();

        assert!(blog.toggle_like(reader));
        assert_eq!(blog.like_count(), 1);

        assert!(!blog.toggle_like(reader));
        assert_eq!(blog.like_count(), 0);
    }

    #[test]
    fn test_likes_from_different_users() {
        let mut blog = blog(Uuid::new_v4());
        blog.toggle_like(Uuid::new_v4());
        blog.toggle_like(Uuid::new_v4());

        assert_eq!(blog.like_count(), 2);
    }

    #[test]
    fn test_add_co_authors_skips_duplicates_and_author() {
        let author = Uuid::new_v4();
        let co_author = Uuid::new_v4();
        let mut blog = blog(author);

        blog.add_co_authors([co_author, co_author, author]);
        blog.add_co_authors([co_author]);

        assert_eq!(blog.co_authors, vec![co_author]);
        assert!(blog.is_co_author(co_author));
        assert!(!blog.is_co_author(author));
        assert!(blog.is_author(author));
    }
}
