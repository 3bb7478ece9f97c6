//! Walks a running todo API through a full CRUD session.
//!
//!   TODO_API_URL (default http://localhost:8000/)

use anyhow::Context;
use tracing::{info, warn};

use arb_lab::logging;
use arb_lab::todo::{TodoClient, TodoInput};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init("todo_client");

    let base = std::env::var("TODO_API_URL").unwrap_or_else(|_| "http://localhost:8000/".into());
    let client = TodoClient::new(&base)?;
    info!("═══ Todo API demo against {} ═══", base);

    info!("1. Welcome");
    let welcome = client.welcome().await?;
    info!("   {}", welcome);

    info!("2. Create first todo");
    let groceries = client
        .create(&TodoInput {
            title: "Buy groceries".into(),
            description: Some("Milk, eggs, bread".into()),
            completed: false,
        })
        .await?;
    info!("   {:?}", groceries);

    info!("3. Create second todo");
    let homework = client
        .create(&TodoInput {
            title: "Do homework".into(),
            description: Some("Math and science".into()),
            completed: false,
        })
        .await?;
    info!("   {:?}", homework);

    info!("4. List todos");
    for todo in client.list().await? {
        info!("   - [{}] {}", if todo.completed { "x" } else { " " }, todo.title);
    }

    info!("5. Get todo {}", groceries.id);
    let fetched = client
        .get(&groceries.id)
        .await?
        .context("freshly created todo is missing")?;
    info!("   {:?}", fetched);

    info!("6. Mark it completed");
    let updated = client
        .update(
            &groceries.id,
            &TodoInput {
                title: groceries.title.clone(),
                description: groceries.description.clone(),
                completed: true,
            },
        )
        .await?;
    info!("   {:?}", updated);

    info!("7. Delete todo {}", homework.id);
    client.delete(&homework.id).await?;

    info!("8. Verify deletion");
    match client.get(&homework.id).await? {
        None => info!("   404 as expected"),
        Some(todo) => warn!("   still present: {:?}", todo),
    }

    info!("9. Final list");
    for todo in client.list().await? {
        info!("   - [{}] {}", if todo.completed { "x" } else { " " }, todo.title);
    }
    Ok(())
}
