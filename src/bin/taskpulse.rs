use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use taskpulse::date_util::{date_key, parse_timestamp};
use taskpulse::query::TaskFilter;
use taskpulse::storage::repository;
use taskpulse::{
    Database, ProductivityReport, ProductivityWindow, SqliteTaskStore, Task, TaskId,
    TaskPriority, TaskPulse, TaskStatus, TaskUpdate, User, UserId, UserStatsReport,
};

#[derive(Parser)]
#[command(name = "taskpulse", about = "Per-user task productivity analytics")]
struct Cli {
    /// Database path (default: ~/.taskpulse/taskpulse.db)
    #[arg(long, env = "TASKPULSE_DB")]
    db: Option<String>,

    /// Reference time, RFC 3339 or YYYY-MM-DD (default: now)
    #[arg(long, global = true)]
    as_of: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate task statistics for a user
    Stats {
        user_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Daily created/completed timeline for a user
    Productivity {
        user_id: String,
        /// Number of days to analyze (1-365)
        #[arg(
            long,
            default_value_t = ProductivityWindow::DEFAULT_DAYS as i64,
            allow_negative_numbers = true
        )]
        days: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Create a demo user with sample tasks
    Seed,
    /// Show store status
    Status,
}

#[derive(Subcommand)]
enum UserAction {
    /// Add a user and print its ID
    Add { name: String },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task for a user and print its ID
    Add {
        user_id: String,
        title: String,
        /// Todo, "In Progress" or Completed
        #[arg(long, default_value = "Todo")]
        status: String,
        /// Low, Medium or High
        #[arg(long, default_value = "Medium")]
        priority: String,
        /// Due date, RFC 3339 or YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// Change a task's status, priority or due date (stamped with --as-of)
    Update {
        task_id: String,
        /// Todo, "In Progress" or Completed
        #[arg(long)]
        status: Option<String>,
        /// Low, Medium or High
        #[arg(long)]
        priority: Option<String>,
        /// Due date, RFC 3339 or YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// List a user's tasks
    List {
        user_id: String,
        /// Only tasks with this status
        #[arg(long)]
        status: Option<String>,
        /// Only tasks with this priority
        #[arg(long)]
        priority: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let as_of = match &cli.as_of {
        Some(s) => parse_timestamp(s)?,
        None => Utc::now(),
    };

    let db = match &cli.db {
        Some(path) => Database::open_at(path).await?,
        None => Database::open().await?,
    };

    match cli.command {
        Commands::Stats { user_id, json } => {
            let pulse = TaskPulse::new(SqliteTaskStore::new(db));
            let report = pulse.user_stats(&user_id, as_of).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_stats(&report);
            }
        }
        Commands::Productivity {
            user_id,
            days,
            json,
        } => {
            let pulse = TaskPulse::new(SqliteTaskStore::new(db));
            let report = pulse.productivity(&user_id, days, as_of).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_productivity(&report);
            }
        }
        Commands::User { action } => handle_user(&db, action, as_of).await?,
        Commands::Task { action } => handle_task(&db, action, as_of).await?,
        Commands::Seed => {
            let user = taskpulse::seed::seed_demo(&db, as_of).await?;
            println!("Seeded demo user: {} ({})", user.name, user.id);
        }
        Commands::Status => print_status(&db).await?,
    }

    Ok(())
}

async fn handle_user(
    db: &Database,
    action: UserAction,
    as_of: DateTime<Utc>,
) -> anyhow::Result<()> {
    match action {
        UserAction::Add { name } => {
            let user = User::new(name);
            let id = user.id;
            db.writer()
                .call(move |conn| repository::upsert_user(conn, &user, &as_of))
                .await?;
            println!("{id}");
        }
    }
    Ok(())
}

async fn handle_task(
    db: &Database,
    action: TaskAction,
    as_of: DateTime<Utc>,
) -> anyhow::Result<()> {
    match action {
        TaskAction::Add {
            user_id,
            title,
            status,
            priority,
            due,
        } => {
            let user: UserId = user_id.parse()?;
            let status: TaskStatus = status.parse()?;
            let priority: TaskPriority = priority.parse()?;
            let mut task = Task::new(user, title, as_of)
                .with_status(status)
                .with_priority(priority);
            if let Some(due) = due {
                task = task.with_due_date(parse_timestamp(&due)?);
            }

            ensure_user(db, user).await?;

            let id = task.id;
            db.writer()
                .call(move |conn| repository::upsert_task(conn, &task))
                .await?;
            println!("{id}");
        }
        TaskAction::Update {
            task_id,
            status,
            priority,
            due,
        } => {
            let id: TaskId = task_id.parse()?;
            let update = TaskUpdate {
                status: status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
                priority: priority.as_deref().map(str::parse::<TaskPriority>).transpose()?,
                due_date: due.as_deref().map(parse_timestamp).transpose()?,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to update: pass --status, --priority or --due");
            }

            let task = db
                .writer()
                .call(move |conn| repository::update_task(conn, &id, &update, &as_of))
                .await?
                .ok_or_else(|| taskpulse::Error::TaskNotFound(task_id))?;
            log::info!("Updated task {} at {}", task.id, as_of);
            println!("{} {} ({})", task.id, task.status, task.priority);
        }
        TaskAction::List {
            user_id,
            status,
            priority,
            json,
        } => {
            let user: UserId = user_id.parse()?;
            let mut filter = TaskFilter::new();
            if let Some(status) = status {
                filter = filter.status(status.parse()?);
            }
            if let Some(priority) = priority {
                filter = filter.priority(priority.parse()?);
            }
            ensure_user(db, user).await?;

            let tasks = db
                .reader()
                .call(move |conn| repository::list_tasks(conn, &user, &filter))
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print_tasks(&tasks);
            }
        }
    }
    Ok(())
}

async fn ensure_user(db: &Database, user: UserId) -> anyhow::Result<()> {
    let exists = db
        .reader()
        .call(move |conn| repository::get_user(conn, &user))
        .await?
        .is_some();
    if !exists {
        anyhow::bail!(taskpulse::Error::UserNotFound(user.to_string()));
    }
    Ok(())
}

async fn print_status(db: &Database) -> anyhow::Result<()> {
    let (users, tasks) = db
        .reader()
        .call(|conn| {
            let users = repository::count_users(conn)?;
            let tasks = repository::count_tasks(conn, None)?;
            Ok::<_, rusqlite::Error>((users, tasks))
        })
        .await?;

    println!("Store Status");
    println!("  Users: {users}");
    println!("  Tasks: {tasks}");
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    println!(
        "  {:<36}  {:<11}  {:<8}  {:<10}  Title",
        "ID", "Status", "Priority", "Due"
    );
    for t in tasks {
        let due = t.due_date.as_ref().map(date_key).unwrap_or_default();
        println!(
            "  {:<36}  {:<11}  {:<8}  {:<10}  {}",
            t.id, t.status, t.priority, due, t.title
        );
    }
}

fn print_stats(r: &UserStatsReport) {
    println!("User Stats: {} ({})", r.user_name, r.user_id);
    println!("  Total:       {}", r.total_tasks);
    println!("  Completed:   {} ({:.1}%)", r.completed, r.completion_rate);
    println!("  In progress: {}", r.in_progress);
    println!("  Todo:        {}", r.todo);
    println!("  Overdue:     {}", r.overdue);
    if r.status_distribution.other > 0 {
        println!("  Other:       {}", r.status_distribution.other);
    }
    println!("  Priority:");
    println!("    High:   {}", r.priority_distribution.high);
    println!("    Medium: {}", r.priority_distribution.medium);
    println!("    Low:    {}", r.priority_distribution.low);
    if r.priority_distribution.other > 0 {
        println!("    Other:  {}", r.priority_distribution.other);
    }
}

fn print_productivity(r: &ProductivityReport) {
    println!(
        "Productivity: {} ({} days, {} to {})",
        r.user_id, r.period_days, r.start_date, r.end_date
    );
    println!("  Created:   {}", r.total_created);
    println!("  Completed: {}", r.total_completed);
    println!("  Avg/day:   {:.2}", r.average_daily_completions);
    println!("  {:<10}  {:>7}  {:>9}", "Date", "Created", "Completed");
    for p in &r.daily_data {
        println!("  {}  {:>7}  {:>9}", p.date, p.created, p.completed);
    }
}
