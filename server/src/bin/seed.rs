//! Development data seeder.
//!
//! Inserts the `admin` and `user` roles with their permission sets and one
//! account per role. Rows that already exist are left untouched, so the
//! seeder can be re-run against a live database.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use staff_server::auth::password::hash_password;
use staff_server::db::{self, Role, UserWrite};
use staff_server::permissions::PermissionSet;

/// Password shared by the seeded accounts.
const SEED_PASSWORD: &str = "Password@01";

struct SeedRole {
    name: &'static str,
    description: &'static str,
    permissions: PermissionSet,
    username: &'static str,
    email: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,staff_server=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let seeds = [
        SeedRole {
            name: "admin",
            description: "Administrator role",
            permissions: PermissionSet::full(),
            username: "admin",
            email: "admin@example.com",
        },
        SeedRole {
            name: "user",
            description: "User role",
            permissions: PermissionSet::read_only(),
            username: "demo",
            email: "demo@example.com",
        },
    ];

    let password_hash = hash_password(SEED_PASSWORD).await?;

    for seed in &seeds {
        let role = seed_role(&pool, seed).await?;
        seed_permissions(&pool, &role, &seed.permissions).await?;
        seed_user(&pool, &role, seed, &password_hash).await?;
    }

    info!("Seeding complete");
    Ok(())
}

async fn seed_role(pool: &PgPool, seed: &SeedRole) -> Result<Role> {
    if let Some(role) = db::find_role_by_name(pool, seed.name).await? {
        info!(role = seed.name, "Role exists, skipping");
        return Ok(role);
    }

    let role = db::create_role(pool, seed.name, Some(seed.description)).await?;
    info!(role = seed.name, role_id = role.id, "Role created");
    Ok(role)
}

async fn seed_permissions(pool: &PgPool, role: &Role, permissions: &PermissionSet) -> Result<()> {
    if db::find_role_with_permission(pool, role.id)
        .await?
        .is_some_and(|(_, permission)| permission.is_some())
    {
        info!(role = %role.role, "Permission set exists, skipping");
        return Ok(());
    }

    let permission = db::create_permission(pool, role.id, permissions).await?;
    info!(role = %role.role, permission_id = permission.id, "Permission set created");
    Ok(())
}

async fn seed_user(pool: &PgPool, role: &Role, seed: &SeedRole, password_hash: &str) -> Result<()> {
    if db::find_user_by_username(pool, seed.username).await?.is_some() {
        info!(username = seed.username, "User exists, skipping");
        return Ok(());
    }

    let user = db::create_user(
        pool,
        &UserWrite {
            username: seed.username,
            password_hash,
            email: seed.email,
            role_id: role.id,
        },
    )
    .await?;
    info!(username = seed.username, user_id = user.id, "User created");
    Ok(())
}
