//! Database seeder for Harambee development and testing.
//!
//! Seeds a test member, GL accounts, a loan product with its account
//! type, and a sanctioned loan application for local development.
//!
//! Usage: cargo run --bin seeder

use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use harambee_db::entities::{
    account_types, gl_accounts, loan_applications, loan_products, members,
    sea_orm_active_enums::LoanStatus,
};

/// Test member ID (consistent for all seeds)
const TEST_MEMBER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Funding GL account ID (consistent for all seeds)
const FUNDING_GL_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Loan product ID (consistent for all seeds)
const LOAN_PRODUCT_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Sanctioned application ID (consistent for all seeds)
const SANCTIONED_APPLICATION_ID: &str = "00000000-0000-0000-0000-000000000004";

const LOAN_PRODUCT_NAME: &str = "Emergency Loan";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = harambee_db::connect(&database_url, 5)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test member...");
    seed_member(&db).await;

    println!("Seeding funding GL account...");
    seed_funding_gl(&db).await;

    println!("Seeding loan product and account type...");
    seed_loan_product(&db).await;

    println!("Seeding sanctioned loan application...");
    seed_application(&db).await;

    println!("Seeding complete!");
}

fn fixed_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap()
}

async fn seed_member(db: &DatabaseConnection) {
    let id = fixed_id(TEST_MEMBER_ID);
    if members::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
        println!("  Test member already exists, skipping");
        return;
    }
    members::ActiveModel {
        id: Set(id),
        member_number: Set("M-0001".to_string()),
        full_name: Set("Test Member".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed member");
}

async fn seed_funding_gl(db: &DatabaseConnection) {
    let id = fixed_id(FUNDING_GL_ID);
    if gl_accounts::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
        println!("  Funding GL account already exists, skipping");
        return;
    }
    gl_accounts::ActiveModel {
        id: Set(id),
        code: Set("GL-LOAN-FUND".to_string()),
        name: Set("Loan Funding Account".to_string()),
        available_balance: Set(dec!(1_000_000)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed funding GL account");
}

async fn seed_loan_product(db: &DatabaseConnection) {
    let id = fixed_id(LOAN_PRODUCT_ID);
    if loan_products::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
        println!("  Loan product already exists, skipping");
        return;
    }
    loan_products::ActiveModel {
        id: Set(id),
        name: Set(LOAN_PRODUCT_NAME.to_string()),
        funding_gl_account_id: Set(fixed_id(FUNDING_GL_ID)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed loan product");

    // matching account type the disbursement flow resolves by name
    account_types::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(format!("{LOAN_PRODUCT_NAME} Account")),
        description: Set(Some("Loan accounts funded at disbursement".to_string())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed account type");
}

async fn seed_application(db: &DatabaseConnection) {
    let id = fixed_id(SANCTIONED_APPLICATION_ID);
    if loan_applications::Entity::find_by_id(id).one(db).await.ok().flatten().is_some() {
        println!("  Loan application already exists, skipping");
        return;
    }
    loan_applications::ActiveModel {
        id: Set(id),
        application_number: Set("LN-0001".to_string()),
        member_id: Set(fixed_id(TEST_MEMBER_ID)),
        product_id: Set(fixed_id(LOAN_PRODUCT_ID)),
        loan_amount: Set(dec!(5000)),
        status: Set(LoanStatus::Sanctioned),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed loan application");
}
