use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::date_util::{parse_timestamp, to_db_timestamp};
use crate::model::{Task, TaskId, TaskUpdate, User, UserId};
use crate::query::TaskFilter;

// ── Users ──────────────────────────────────────────────────────────

pub fn upsert_user(
    conn: &Connection,
    user: &User,
    created_at: &DateTime<Utc>,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO users (user_id, name, created_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET name = excluded.name",
        params![user.id.to_string(), user.name, to_db_timestamp(created_at)],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &UserId) -> Result<Option<User>, rusqlite::Error> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM users WHERE user_id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name.map(|name| User { id: *id, name }))
}

pub fn count_users(conn: &Connection) -> Result<u64, rusqlite::Error> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(n as u64)
}

// ── Tasks ──────────────────────────────────────────────────────────

pub fn upsert_task(conn: &Connection, task: &Task) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO tasks (
            task_id, user_id, title, status, priority, due_date, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(task_id) DO UPDATE SET
            user_id=excluded.user_id, title=excluded.title, status=excluded.status,
            priority=excluded.priority, due_date=excluded.due_date,
            updated_at=excluded.updated_at",
        params![
            task.id.to_string(),
            task.user.to_string(),
            task.title,
            task.status,
            task.priority,
            task.due_date.as_ref().map(to_db_timestamp),
            to_db_timestamp(&task.created_at),
            to_db_timestamp(&task.updated_at),
        ],
    )?;
    Ok(())
}

const TASK_COLUMNS: &str = "t.task_id, t.user_id, t.title, t.status, t.priority, t.due_date, \
                            t.created_at, t.updated_at";

fn conversion_error(idx: usize, e: crate::error::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn timestamp_at(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

fn row_to_task(row: &Row) -> Result<Task, rusqlite::Error> {
    let id: String = row.get(0)?;
    let user: String = row.get(1)?;
    let due_date = match row.get::<_, Option<String>>(5)? {
        Some(raw) => Some(parse_timestamp(&raw).map_err(|e| conversion_error(5, e))?),
        None => None,
    };
    Ok(Task {
        id: id.parse().map_err(|e| conversion_error(0, e))?,
        user: user.parse().map_err(|e| conversion_error(1, e))?,
        title: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        due_date,
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
    })
}

pub fn get_task(conn: &Connection, id: &TaskId) -> Result<Option<Task>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.task_id = ?1"),
        params![id.to_string()],
        row_to_task,
    )
    .optional()
}

/// A user's tasks matching `filter`, oldest first.
pub fn list_tasks(
    conn: &Connection,
    user: &UserId,
    filter: &TaskFilter,
) -> Result<Vec<Task>, rusqlite::Error> {
    let (where_clause, filter_params) = filter.build_sql(2);
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks t
         WHERE t.user_id = ?1{where_clause}
         ORDER BY t.created_at, t.task_id"
    );
    let user = user.to_string();
    let mut param_refs: Vec<&dyn ToSql> = Vec::with_capacity(filter_params.len() + 1);
    param_refs.push(&user);
    param_refs.extend(filter_params.iter().map(|p| p.as_ref()));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), row_to_task)?;
    rows.collect()
}

/// Apply `update` to a stored task as a mutation made at `at`. Returns the
/// updated task, or `None` when no task has that ID.
pub fn update_task(
    conn: &Connection,
    id: &TaskId,
    update: &TaskUpdate,
    at: &DateTime<Utc>,
) -> Result<Option<Task>, rusqlite::Error> {
    let Some(mut task) = get_task(conn, id)? else {
        return Ok(None);
    };
    task.apply(update, *at);
    upsert_task(conn, &task)?;
    Ok(Some(task))
}

pub fn count_tasks(conn: &Connection, user: Option<&UserId>) -> Result<u64, rusqlite::Error> {
    let n: i64 = match user {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?,
    };
    Ok(n as u64)
}
