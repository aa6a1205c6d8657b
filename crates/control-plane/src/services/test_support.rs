// Fixtures shared by service tests

use stamprally_core::{Actor, UserRole};

use crate::storage::{CreateUserRow, EventFields, StorageBackend, UserRow};

pub async fn seed_user(db: &StorageBackend, employee_code: &str) -> UserRow {
    db.create_user(CreateUserRow {
        employee_code: employee_code.to_string(),
        password: "99".to_string(),
        role: "user".to_string(),
    })
    .await
    .unwrap()
}

pub async fn admin(db: &StorageBackend) -> Actor {
    let row = db
        .create_user(CreateUserRow {
            employee_code: "999".to_string(),
            password: "99".to_string(),
            role: "admin".to_string(),
        })
        .await
        .unwrap();
    Actor::new(row.id, UserRole::Admin)
}

pub fn actor(user: &UserRow) -> Actor {
    Actor::new(user.id, UserRole::from(user.role.as_str()))
}

pub fn event_fields(title: &str, event_type: &str, points: i32) -> EventFields {
    EventFields {
        title: title.to_string(),
        event_type: event_type.to_string(),
        points,
        ..Default::default()
    }
}
