// Demo account seeding, run once at startup
//
// Idempotent: an existing demo user is reused and its library is only
// filled when empty.

use chrono::NaiveDate;
use tracing::info;

use crate::auth::{models::ValidatedRegistration, AuthError, AuthService};
use crate::library::{LibraryError, LibraryService, NewEntry};

pub const DEMO_EMAIL: &str = "demo@test.com";
pub const DEMO_PASSWORD: &str = "1234567890";
const DEMO_CELLPHONE: i64 = 5555555555;

const SAMPLE_BOOKS: [(&str, &str, (i32, u32, u32), &str); 8] = [
    ("The Left Hand of Darkness", "Ursula K. Le Guin", (2016, 3, 14), "Slow start, unforgettable ending."),
    ("Middlemarch", "George Eliot", (2017, 8, 2), "Worth every page."),
    ("The Remains of the Day", "Kazuo Ishiguro", (2018, 1, 21), "Quiet and devastating."),
    ("Dune", "Frank Herbert", (2018, 11, 5), "Read the appendices."),
    ("Beloved", "Toni Morrison", (2019, 6, 30), "Needs a second reading."),
    ("The Name of the Rose", "Umberto Eco", (2020, 2, 11), "The library scenes stay with you."),
    ("Pride and Prejudice", "Jane Austen", (2021, 9, 9), "Funnier than remembered."),
    ("Piranesi", "Susanna Clarke", (2022, 12, 1), "Short and strange."),
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("demo user: {0}")]
    User(#[from] AuthError),
    #[error("demo library: {0}")]
    Library(#[from] LibraryError),
}

/// Ensure the demo user exists and owns a starter library
///
/// Returns the number of entries created (zero when already seeded).
pub async fn seed_demo_account(
    auth: &AuthService,
    library: &LibraryService,
) -> Result<usize, SeedError> {
    let user = match auth.users().find_by_email(DEMO_EMAIL).await.map_err(AuthError::from)? {
        Some(user) => user,
        None => {
            auth.create_user(ValidatedRegistration {
                email: DEMO_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
                cellphone: DEMO_CELLPHONE,
            })
            .await?
        }
    };

    let existing = library
        .store()
        .count_for_user(user.id)
        .await
        .map_err(LibraryError::from)?;
    if existing > 0 {
        info!("Demo account already seeded.");
        return Ok(0);
    }

    let mut created = 0;
    for (title, author, (year, month, day), comments) in SAMPLE_BOOKS {
        let Some(date_finished) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        library
            .add_entry(
                user.id,
                NewEntry {
                    title: title.to_string(),
                    author: author.to_string(),
                    date_finished,
                    comments: Some(comments.to_string()),
                },
            )
            .await?;
        created += 1;
    }

    info!("Seeded demo account with {} entries.", created);
    Ok(created)
}
