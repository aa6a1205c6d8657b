// Demo data for development and fresh installs
// Decision: Idempotent by natural key (employee code, event title, reward name);
// existing rows are left untouched
// Decision: Parents are inserted before their practice sessions so titles resolve

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};

use crate::storage::{CreateRewardRow, CreateUserRow, EventFields, StorageBackend};

const DEMO_PASSWORD: &str = "99";

const USERS: &[(&str, &str)] = &[("999", "admin"), ("1", "user"), ("2", "user"), ("3", "user")];

struct EventSeed {
    title: &'static str,
    description: &'static str,
    date: &'static str,
    event_type: &'static str,
    parent: Option<&'static str>,
    location: Option<&'static str>,
    hours: Option<(&'static str, &'static str)>,
    capacity: Option<i32>,
    contact_name: Option<&'static str>,
    points: i32,
    notes: Option<&'static str>,
}

const FUTSAL_CLUB: &str = "Futsal club (annual)";
const MARATHON_CLUB: &str = "Marathon training club (annual)";

const EVENTS: &[EventSeed] = &[
    EventSeed {
        title: FUTSAL_CLUB,
        description: "Year-round futsal sessions",
        date: "2025-01-01",
        event_type: "annual",
        parent: None,
        location: None,
        hours: None,
        capacity: None,
        contact_name: None,
        points: 1,
        notes: None,
    },
    EventSeed {
        title: MARATHON_CLUB,
        description: "Year-round running practice",
        date: "2025-01-01",
        event_type: "annual",
        parent: None,
        location: None,
        hours: None,
        capacity: None,
        contact_name: None,
        points: 1,
        notes: None,
    },
    EventSeed {
        title: "Health seminar: sleep",
        description: "What good sleep looks like",
        date: "2025-09-25",
        event_type: "single",
        parent: None,
        location: Some("Meeting room A"),
        hours: Some(("10:00", "11:00")),
        capacity: Some(30),
        contact_name: Some("General affairs"),
        points: 1,
        notes: Some("Doors open 10 minutes before start"),
    },
    EventSeed {
        title: "Company golf tournament",
        description: "Beginners welcome",
        date: "2025-10-12",
        event_type: "single",
        parent: None,
        location: Some("Country club"),
        hours: Some(("08:00", "15:00")),
        capacity: Some(24),
        contact_name: Some("Human resources"),
        points: 2,
        notes: Some("Rental clubs available"),
    },
    EventSeed {
        title: "City marathon",
        description: "10 km or half marathon",
        date: "2025-11-03",
        event_type: "single",
        parent: None,
        location: Some("City hall start line"),
        hours: Some(("09:00", "13:00")),
        capacity: Some(100),
        contact_name: Some("Wellness team"),
        points: 2,
        notes: Some("Held rain or shine"),
    },
    EventSeed {
        title: "Wellbeing survey (autumn)",
        description: "Takes about 3 minutes",
        date: "2025-10-01",
        event_type: "survey",
        parent: None,
        location: Some("Online"),
        hours: Some(("00:00", "23:59")),
        capacity: None,
        contact_name: Some("Corporate office"),
        points: 1,
        notes: Some("Anonymous answers allowed"),
    },
    EventSeed {
        title: "Office photo call (autumn)",
        description: "Theme: autumn sports",
        date: "2025-10-10",
        event_type: "survey",
        parent: None,
        location: Some("Online upload"),
        hours: Some(("00:00", "23:59")),
        capacity: None,
        contact_name: Some("Communications"),
        points: 1,
        notes: Some("JPEG or PNG"),
    },
    EventSeed {
        title: "Futsal practice, October week 1",
        description: "Company gym",
        date: "2025-10-05",
        event_type: "practice",
        parent: Some(FUTSAL_CLUB),
        location: Some("Company gym"),
        hours: Some(("19:00", "21:00")),
        capacity: Some(20),
        contact_name: Some("Club organiser"),
        points: 1,
        notes: None,
    },
    EventSeed {
        title: "Futsal practice, October week 3",
        description: "Company gym",
        date: "2025-10-19",
        event_type: "practice",
        parent: Some(FUTSAL_CLUB),
        location: Some("Company gym"),
        hours: Some(("19:00", "21:00")),
        capacity: Some(20),
        contact_name: Some("Club organiser"),
        points: 1,
        notes: None,
    },
    EventSeed {
        title: "Run practice: 10 km build-up",
        description: "Saturday morning",
        date: "2025-10-12",
        event_type: "practice",
        parent: Some(MARATHON_CLUB),
        location: Some("Meet in front of the office"),
        hours: Some(("07:00", "08:30")),
        capacity: Some(30),
        contact_name: Some("Running coach"),
        points: 1,
        notes: None,
    },
];

const REWARDS: &[(&str, i32)] = &[
    ("Free cafe drink", 3),
    ("Convenience store dessert voucher", 3),
    ("Sports towel", 4),
    ("Protein bar", 4),
    ("Healthy lunch discount", 5),
    ("Bottled water set", 5),
    ("Workout gloves", 6),
    ("Running socks", 7),
    ("Resistance band", 8),
    ("Smart scale discount voucher", 10),
];

/// Counts of rows inserted by one seeding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub events: usize,
    pub rewards: usize,
}

/// Insert any missing demo users, events and rewards.
pub async fn seed_demo_data(db: &StorageBackend) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (code, role) in USERS {
        if db.get_user_by_employee_code(code).await?.is_some() {
            continue;
        }
        db.create_user(CreateUserRow {
            employee_code: (*code).to_string(),
            password: DEMO_PASSWORD.to_string(),
            role: (*role).to_string(),
        })
        .await?;
        report.users += 1;
    }

    for seed in EVENTS {
        if db.get_event_by_title(seed.title).await?.is_some() {
            continue;
        }
        let fields = event_fields(db, seed).await?;
        db.create_event(fields).await?;
        report.events += 1;
    }

    for (name, required_stamps) in REWARDS {
        if db.get_reward_by_name(name).await?.is_some() {
            continue;
        }
        db.create_reward(CreateRewardRow {
            name: (*name).to_string(),
            required_stamps: *required_stamps,
        })
        .await?;
        report.rewards += 1;
    }

    tracing::info!(
        users = report.users,
        events = report.events,
        rewards = report.rewards,
        "Demo data seeded"
    );
    Ok(report)
}

async fn event_fields(db: &StorageBackend, seed: &EventSeed) -> Result<EventFields> {
    let parent_event_id = match seed.parent {
        Some(title) => db.get_event_by_title(title).await?.map(|e| e.id),
        None => None,
    };
    let (start_time, end_time) = match seed.hours {
        Some((start, end)) => (Some(time(start)?), Some(time(end)?)),
        None => (None, None),
    };

    Ok(EventFields {
        title: seed.title.to_string(),
        description: Some(seed.description.to_string()),
        date: Some(
            NaiveDate::parse_from_str(seed.date, "%Y-%m-%d")
                .with_context(|| format!("bad seed date {}", seed.date))?,
        ),
        location: seed.location.map(String::from),
        start_time,
        end_time,
        capacity: seed.capacity,
        contact_name: seed.contact_name.map(String::from),
        notes: seed.notes.map(String::from),
        event_type: seed.event_type.to_string(),
        points: seed.points,
        parent_event_id,
    })
}

fn time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").with_context(|| format!("bad seed time {value}"))
}
