// ============================
// worksphere-backend-lib/src/slug.rs
// ============================
//! Name to slug conversion and collision-free slug allocation.
//!
//! Allocation is check-then-act: the loop below only finds a slug that was
//! free when it looked. The unique index on `workspaces.slug` is what actually
//! guarantees uniqueness; when a concurrent writer takes the slug first the
//! write fails with [`AppError::SlugConflict`] and [`with_allocated_slug`]
//! allocates again. Each retry observes the competing row, so it terminates.
use std::future::Future;

use metrics::counter;
use tracing::{debug, warn};
use worksphere_common::WorkspaceId;

use crate::error::AppError;
use crate::metrics::{SLUG_COLLISION, SLUG_CONFLICT_RETRY};
use crate::storage::Storage;

/// Base slug used when a name has no usable characters at all
pub const FALLBACK_SLUG: &str = "workspace";

/// How many times a lost insert race is retried before giving up
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Turn a human readable name into a lowercase, hyphen separated ASCII slug.
///
/// Pure: the same name always gives the same slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            push_part(&mut slug, &mut pending_separator, c.to_ascii_lowercase().encode_utf8(&mut [0; 4]));
        } else if c == '&' {
            // `R&D` reads as `r-and-d`
            pending_separator = true;
            push_part(&mut slug, &mut pending_separator, "and");
            pending_separator = true;
        } else if let Some(ascii) = transliterate(c) {
            push_part(&mut slug, &mut pending_separator, ascii);
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

fn push_part(slug: &mut String, pending_separator: &mut bool, part: &str) {
    if *pending_separator && !slug.is_empty() {
        slug.push('-');
    }
    *pending_separator = false;
    slug.push_str(part);
}

/// Latin letters with diacritics and a few ligatures
fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ą' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ą' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'ć' | 'č' | 'Ç' | 'Ć' | 'Č' => "c",
        'ď' | 'đ' | 'ð' | 'Ď' | 'Đ' | 'Ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' | 'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' => "e",
        'ğ' | 'Ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'İ' => "i",
        'ł' | 'Ł' => "l",
        'ñ' | 'ń' | 'ň' | 'Ñ' | 'Ń' | 'Ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => "o",
        'œ' | 'Œ' => "oe",
        'ř' | 'Ř' => "r",
        'ś' | 'š' | 'ş' | 'Ś' | 'Š' | 'Ş' => "s",
        'ß' => "ss",
        'ť' | 'Ť' => "t",
        'þ' | 'Þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' => "u",
        'ý' | 'ÿ' | 'Ý' | 'Ÿ' => "y",
        'ź' | 'ż' | 'ž' | 'Ź' | 'Ż' | 'Ž' => "z",
        _ => return None,
    };
    Some(s)
}

/// Find the first free slug for `name`: `base`, then `base-1`, `base-2`, ...
///
/// `exclude` is the workspace being renamed, so its current slug does not
/// count as a collision.
pub async fn allocate<S>(
    storage: &S,
    name: &str,
    exclude: Option<WorkspaceId>,
) -> Result<String, AppError>
where
    S: Storage + ?Sized,
{
    let base = slugify(name);
    let mut candidate = base.clone();
    let mut counter: u64 = 1;

    while storage.slug_exists(&candidate, exclude).await? {
        debug!(slug = %candidate, "slug taken");
        counter!(SLUG_COLLISION).increment(1);
        candidate = format!("{base}-{counter}");
        counter += 1;
    }

    Ok(candidate)
}

/// Allocate a slug for `name` and hand it to `write`.
///
/// If `write` fails with [`AppError::SlugConflict`] another writer claimed the
/// slug in between, and allocation starts over, at most
/// [`MAX_SLUG_ATTEMPTS`] times.
pub async fn with_allocated_slug<S, T, F, Fut>(
    storage: &S,
    name: &str,
    exclude: Option<WorkspaceId>,
    mut write: F,
) -> Result<T, AppError>
where
    S: Storage + ?Sized,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        let slug = allocate(storage, name, exclude).await?;
        match write(slug).await {
            Err(AppError::SlugConflict(slug)) if attempt < MAX_SLUG_ATTEMPTS => {
                warn!(%slug, attempt, "slug claimed concurrently, allocating again");
                counter!(SLUG_CONFLICT_RETRY).increment(1);
                attempt += 1;
            },
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NewUser, NewWorkspace, SqliteStorage};
    use crate::test_support::StaleSlugCheck;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Workspace"), "my-workspace");
        assert_eq!(slugify("Acme Inc"), "acme-inc");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("already-slugged"), "already-slugged");
        assert_eq!(slugify("snake_case_name"), "snake-case-name");
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("Straße"), "strasse");
        assert_eq!(slugify("Tom & Jerry"), "tom-and-jerry");
        assert_eq!(slugify("R&D"), "r-and-d");
        assert_eq!(slugify("Q3 2024 -- Plan"), "q3-2024-plan");
    }

    #[test]
    fn test_slugify_degenerate_names() {
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify("日本"), FALLBACK_SLUG);
        assert_eq!(slugify("---"), FALLBACK_SLUG);
    }

    #[test]
    fn test_slugify_is_deterministic_and_url_safe() {
        for name in ["Ünïcödé Nämé", "a/b\\c?d#e", "MiXeD 123", "Ω mega"] {
            let slug = slugify(name);
            assert_eq!(slug, slugify(name));
            assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
        }
    }

    async fn setup() -> (SqliteStorage, i64) {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let user = storage
            .create_user(NewUser { name: "Ada", email: "ada@example.com", password_hash: "x" })
            .await
            .unwrap();
        (storage, user.id)
    }

    async fn create(storage: &SqliteStorage, owner: i64, name: &str) -> String {
        with_allocated_slug(storage, name, None, |slug| async move {
            storage
                .create_workspace(NewWorkspace { name, slug: &slug, owner_id: owner })
                .await
        })
        .await
        .unwrap()
        .slug
    }

    #[tokio::test]
    async fn test_allocate_sequence() {
        let (storage, owner) = setup().await;
        assert_eq!(allocate(&storage, "My Workspace", None).await.unwrap(), "my-workspace");

        assert_eq!(create(&storage, owner, "My Workspace").await, "my-workspace");
        assert_eq!(create(&storage, owner, "My Workspace").await, "my-workspace-1");
        assert_eq!(create(&storage, owner, "My Workspace").await, "my-workspace-2");
    }

    #[tokio::test]
    async fn test_allocate_excludes_self() {
        let (storage, owner) = setup().await;
        create(&storage, owner, "Foo").await;
        let ws = storage.find_workspace_by_slug("foo").await.unwrap().unwrap();

        assert_eq!(allocate(&storage, "Foo", Some(ws.id)).await.unwrap(), "foo");
        assert_eq!(allocate(&storage, "Foo", None).await.unwrap(), "foo-1");
    }

    #[tokio::test]
    async fn test_lost_race_is_retried() {
        let (storage, owner) = setup().await;
        create(&storage, owner, "Acme").await;

        // The pre-check misses the existing row once, as if another request
        // committed `acme` right after we looked.
        let stale = StaleSlugCheck::new(storage.clone(), 1);
        let writes = AtomicUsize::new(0);
        let ws = with_allocated_slug(&stale, "Acme", None, |slug| {
            writes.fetch_add(1, Ordering::SeqCst);
            let stale = &stale;
            async move {
                stale
                    .create_workspace(NewWorkspace { name: "Acme", slug: &slug, owner_id: owner })
                    .await
            }
        })
        .await
        .unwrap();

        assert_eq!(ws.slug, "acme-1");
        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (storage, _) = setup().await;
        let attempts = AtomicUsize::new(0);
        let result: Result<(), _> = with_allocated_slug(&storage, "Busy", None, |slug| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err(AppError::SlugConflict(slug)) }
        })
        .await;

        assert!(matches!(result, Err(AppError::SlugConflict(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_SLUG_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let (storage, _) = setup().await;
        let attempts = AtomicUsize::new(0);
        let result: Result<(), _> = with_allocated_slug(&storage, "Busy", None, |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Internal("boom".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
