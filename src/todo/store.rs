use std::sync::Arc;

use tokio::sync::RwLock;

use super::model::{Todo, TodoInput};

/// In-memory todo list, insertion ordered.
#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    items: Arc<RwLock<Vec<Todo>>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Todo> {
        self.items.read().await.clone()
    }

    pub async fn create(&self, input: TodoInput) -> Todo {
        let todo = Todo::from_input(input);
        self.items.write().await.push(todo.clone());
        todo
    }

    pub async fn get(&self, id: &str) -> Option<Todo> {
        self.items.read().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn update(&self, id: &str, input: TodoInput) -> Option<Todo> {
        let mut items = self.items.write().await;
        let todo = items.iter_mut().find(|t| t.id == id)?;
        todo.apply(input);
        Some(todo.clone())
    }

    /// Returns `false` when no todo has this id.
    pub async fn delete(&self, id: &str) -> bool {
        let mut items = self.items.write().await;
        match items.iter().position(|t| t.id == id) {
            Some(idx) => {
                items.remove(idx);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> TodoInput {
        TodoInput {
            title: title.into(),
            description: None,
            completed: false,
        }
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let store = TodoStore::new();
        let a = store.create(input("a")).await;
        let b = store.create(input("b")).await;

        let titles: Vec<String> = store.list().await.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(store.get(&a.id).await, Some(a.clone()));

        let updated = store
            .update(
                &b.id,
                TodoInput {
                    title: "b2".into(),
                    description: Some("d".into()),
                    completed: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, b.id);
        assert!(updated.completed);

        assert!(store.delete(&a.id).await);
        assert!(!store.delete(&a.id).await);
        assert!(store.get(&a.id).await.is_none());
        assert_eq!(store.list().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = TodoStore::new();
        assert!(store.update("nope", input("x")).await.is_none());
    }
}
