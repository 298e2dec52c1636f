use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{BlogPostPatch, BlogsRepo, CollectionRepo, NewBlogPost, RepoError},
    domain::entities::{BlogPost, BlogRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

const BLOG_COLUMNS: &str = "id, title, excerpt, content, author, published_at, updated_at, \
    category, tags, image_url, featured, status, seo_title, seo_description, seo_keywords";

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: Uuid,
    title: String,
    excerpt: Option<String>,
    content: Option<String>,
    author: String,
    published_at: Option<OffsetDateTime>,
    updated_at: Option<OffsetDateTime>,
    category: Option<String>,
    tags: Option<Vec<String>>,
    image_url: Option<String>,
    featured: Option<bool>,
    status: Option<String>,
    seo_title: Option<String>,
    seo_description: Option<String>,
    seo_keywords: Option<Vec<String>>,
}

impl From<BlogRow> for BlogPost {
    fn from(row: BlogRow) -> Self {
        BlogPost::from(BlogRecord {
            id: row.id,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            author: row.author,
            published_at: row.published_at,
            updated_at: row.updated_at,
            category: row.category,
            tags: row.tags,
            image_url: row.image_url,
            featured: row.featured,
            status: row.status,
            seo_title: row.seo_title,
            seo_description: row.seo_description,
            seo_keywords: row.seo_keywords,
        })
    }
}

#[async_trait]
impl CollectionRepo<BlogPost> for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        // DESC sorts NULLs first in PostgreSQL.
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs ORDER BY published_at DESC, id DESC");
        let rows = sqlx::query_as::<_, BlogRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }
}

#[async_trait]
impl BlogsRepo for PostgresRepositories {
    async fn create_post(&self, post: NewBlogPost) -> Result<BlogPost, RepoError> {
        let sql = format!(
            "INSERT INTO blogs (title, excerpt, content, author, category, tags, image_url, \
             featured, status, seo_title, seo_description, seo_keywords) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {BLOG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(post.title)
            .bind(post.excerpt)
            .bind(post.content)
            .bind(post.author)
            .bind(post.category)
            .bind(post.tags)
            .bind(post.image_url)
            .bind(post.featured)
            .bind(post.status.as_str())
            .bind(post.seo_title)
            .bind(post.seo_description)
            .bind(post.seo_keywords)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(BlogPost::from(row))
    }

    async fn update_post(&self, id: Uuid, patch: BlogPostPatch) -> Result<BlogPost, RepoError> {
        if patch.is_empty() {
            let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
            return sqlx::query_as::<_, BlogRow>(&sql)
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?
                .map(BlogPost::from)
                .ok_or(RepoError::NotFound);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE blogs SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = patch.title {
                set.push("title = ").push_bind_unseparated(title);
            }
            if let Some(excerpt) = patch.excerpt {
                set.push("excerpt = ").push_bind_unseparated(excerpt);
            }
            if let Some(content) = patch.content {
                set.push("content = ").push_bind_unseparated(content);
            }
            if let Some(author) = patch.author {
                set.push("author = ").push_bind_unseparated(author);
            }
            if let Some(category) = patch.category {
                set.push("category = ").push_bind_unseparated(category);
            }
            if let Some(tags) = patch.tags {
                set.push("tags = ").push_bind_unseparated(tags);
            }
            if let Some(image_url) = patch.image_url {
                set.push("image_url = ").push_bind_unseparated(image_url);
            }
            if let Some(featured) = patch.featured {
                set.push("featured = ").push_bind_unseparated(featured);
            }
            if let Some(status) = patch.status {
                set.push("status = ")
                    .push_bind_unseparated(status.as_str().to_string());
            }
            if let Some(seo_title) = patch.seo_title {
                set.push("seo_title = ").push_bind_unseparated(seo_title);
            }
            if let Some(seo_description) = patch.seo_description {
                set.push("seo_description = ")
                    .push_bind_unseparated(seo_description);
            }
            if let Some(seo_keywords) = patch.seo_keywords {
                set.push("seo_keywords = ").push_bind_unseparated(seo_keywords);
            }
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING ");
        qb.push(BLOG_COLUMNS);

        qb.build_query_as::<BlogRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .map(BlogPost::from)
            .ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: Uuid) -> Result<Uuid, RepoError> {
        sqlx::query_scalar::<_, Uuid>("DELETE FROM blogs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)
    }
}
