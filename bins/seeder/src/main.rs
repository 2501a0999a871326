//! Database seeder for Remvio development and testing.
//!
//! Seeds a platform organisation, two partner agencies with a corridor
//! between them, charge definitions, custody accounts, the GL chart, and an
//! initial float deposit for the origin agency.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use remvio_db::entities::{
    charges, corridors, currencies, custody_accounts, customers, beneficiaries, gl_accounts,
    org_balances, organizations, parameters, users,
    sea_orm_active_enums::{
        ChargeKind, CorridorStatus, CustodyKind, GlAccountType, GlEntityKind, IntegrationKind,
        OrgStatus, RateKind,
    },
};
use remvio_db::repositories::{FloatLedgerRepository, PARAM_REQUIRE_OPEN_TILL};
use remvio_shared::Actor;

/// Platform organisation id (consistent for all seeds)
const PLATFORM_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Origin agency id
const ORIGIN_ORG_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Destination agency id
const DEST_ORG_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Origin teller id
const ORIGIN_TELLER_ID: &str = "00000000-0000-0000-0000-000000000012";
/// Destination teller id
const DEST_TELLER_ID: &str = "00000000-0000-0000-0000-000000000013";
/// Corridor id
const CORRIDOR_ID: &str = "00000000-0000-0000-0000-000000000021";
/// Commission charge id
const COMMISSION_CHARGE_ID: &str = "00000000-0000-0000-0000-000000000031";
/// Tax charge id
const TAX_CHARGE_ID: &str = "00000000-0000-0000-0000-000000000032";
/// Test customer id
const CUSTOMER_ID: &str = "00000000-0000-0000-0000-000000000041";
/// Test beneficiary id
const BENEFICIARY_ID: &str = "00000000-0000-0000-0000-000000000042";

fn id(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("hardcoded uuid")
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = remvio_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding organizations...");
    seed_organizations(&db).await;

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding corridor...");
    seed_corridor(&db).await;

    println!("Seeding charges...");
    seed_charges(&db).await;

    println!("Seeding customer and beneficiary...");
    seed_customer(&db).await;

    println!("Seeding custody accounts...");
    seed_custody_accounts(&db).await;

    println!("Seeding parameters...");
    seed_parameters(&db).await;

    println!("Funding origin float...");
    seed_float(&db).await;

    println!("Seeding GL chart...");
    seed_gl_accounts(&db).await;

    println!("Seeding complete!");
}

async fn usd_id(db: &DatabaseConnection) -> Uuid {
    currencies::Entity::find()
        .filter(currencies::Column::Code.eq("USD"))
        .one(db)
        .await
        .expect("currency lookup failed")
        .expect("USD missing, run the migrator first")
        .id
}

async fn seed_organizations(db: &DatabaseConnection) {
    let orgs = [
        (PLATFORM_ORG_ID, "REMVIO", "Remvio Platform", true),
        (ORIGIN_ORG_ID, "KE-AGENT", "Nairobi Agency", false),
        (DEST_ORG_ID, "SO-AGENT", "Mogadishu Agency", false),
    ];

    for (org_id, code, name, is_platform) in orgs {
        if organizations::Entity::find_by_id(id(org_id))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Organization {code} already exists, skipping...");
            continue;
        }

        let org = organizations::ActiveModel {
            id: Set(id(org_id)),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            status: Set(OrgStatus::Active),
            integration: Set(IntegrationKind::Internal),
            is_platform: Set(is_platform),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        match org.insert(db).await {
            Ok(_) => println!("  Created organization {code}"),
            Err(e) => eprintln!("Failed to insert organization {code}: {e}"),
        }
    }
}

async fn seed_users(db: &DatabaseConnection) {
    let tellers = [
        (ORIGIN_TELLER_ID, ORIGIN_ORG_ID, "Origin Teller"),
        (DEST_TELLER_ID, DEST_ORG_ID, "Destination Teller"),
    ];

    for (user_id, org_id, name) in tellers {
        if users::Entity::find_by_id(id(user_id))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            continue;
        }

        let user = users::ActiveModel {
            id: Set(id(user_id)),
            organization_id: Set(id(org_id)),
            name: Set(name.to_string()),
            email: Set(None),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {name}: {e}");
        } else {
            println!("  Created user {name}");
        }
    }
}

async fn seed_corridor(db: &DatabaseConnection) {
    if corridors::Entity::find_by_id(id(CORRIDOR_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Corridor already exists, skipping...");
        return;
    }

    let corridor = corridors::ActiveModel {
        id: Set(id(CORRIDOR_ID)),
        origin_org_id: Set(id(ORIGIN_ORG_ID)),
        dest_org_id: Set(id(DEST_ORG_ID)),
        currency_id: Set(usd_id(db).await),
        status: Set(CorridorStatus::Active),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = corridor.insert(db).await {
        eprintln!("Failed to insert corridor: {e}");
    } else {
        println!("  Created KE-AGENT -> SO-AGENT corridor (USD)");
    }
}

async fn seed_charges(db: &DatabaseConnection) {
    let rows = [
        (
            COMMISSION_CHARGE_ID,
            "Transfer commission",
            ChargeKind::Commission,
            dec!(2),
            (dec!(40), dec!(40), dec!(20)),
        ),
        (
            TAX_CHARGE_ID,
            "Levy on fees",
            ChargeKind::Tax,
            dec!(10),
            (dec!(100), dec!(0), dec!(0)),
        ),
    ];

    for (charge_id, name, kind, rate, (internal, origin, destination)) in rows {
        if charges::Entity::find_by_id(id(charge_id))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            continue;
        }

        let charge = charges::ActiveModel {
            id: Set(id(charge_id)),
            name: Set(name.to_string()),
            kind: Set(kind),
            rate_kind: Set(RateKind::Percentage),
            rate_value: Set(rate),
            min_amount: Set(None),
            max_amount: Set(None),
            currency_id: Set(None),
            origin_org_id: Set(None),
            dest_org_id: Set(None),
            internal_share: Set(internal),
            origin_share: Set(origin),
            destination_share: Set(destination),
            reversible: Set(true),
            active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = charge.insert(db).await {
            eprintln!("Failed to insert charge {name}: {e}");
        } else {
            println!("  Created charge {name}");
        }
    }
}

async fn seed_customer(db: &DatabaseConnection) {
    if customers::Entity::find_by_id(id(CUSTOMER_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_none()
    {
        let customer = customers::ActiveModel {
            id: Set(id(CUSTOMER_ID)),
            organization_id: Set(id(ORIGIN_ORG_ID)),
            name: Set("Test Customer".to_string()),
            phone: Set(Some("+254700000001".to_string())),
            created_at: Set(Utc::now().into()),
        };
        if let Err(e) = customer.insert(db).await {
            eprintln!("Failed to insert customer: {e}");
        } else {
            println!("  Created test customer");
        }
    }

    if beneficiaries::Entity::find_by_id(id(BENEFICIARY_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_none()
    {
        let beneficiary = beneficiaries::ActiveModel {
            id: Set(id(BENEFICIARY_ID)),
            customer_id: Set(id(CUSTOMER_ID)),
            name: Set("Test Beneficiary".to_string()),
            phone: Set(Some("+252600000001".to_string())),
            created_at: Set(Utc::now().into()),
        };
        if let Err(e) = beneficiary.insert(db).await {
            eprintln!("Failed to insert beneficiary: {e}");
        } else {
            println!("  Created test beneficiary");
        }
    }
}

async fn seed_custody_accounts(db: &DatabaseConnection) {
    let currency = usd_id(db).await;
    let accounts = [
        (ORIGIN_ORG_ID, CustodyKind::Till, "Nairobi main till"),
        (ORIGIN_ORG_ID, CustodyKind::Vault, "Nairobi vault"),
        (DEST_ORG_ID, CustodyKind::Till, "Mogadishu main till"),
    ];

    for (org_id, kind, name) in accounts {
        let existing = custody_accounts::Entity::find()
            .filter(custody_accounts::Column::OrganizationId.eq(id(org_id)))
            .filter(custody_accounts::Column::Name.eq(name))
            .one(db)
            .await
            .ok()
            .flatten();
        if existing.is_some() {
            continue;
        }

        let account = custody_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(id(org_id)),
            currency_id: Set(currency),
            kind: Set(kind),
            name: Set(name.to_string()),
            balance: Set(Decimal::ZERO),
            locked_balance: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = account.insert(db).await {
            eprintln!("Failed to insert custody account {name}: {e}");
        } else {
            println!("  Created custody account {name}");
        }
    }
}

async fn seed_parameters(db: &DatabaseConnection) {
    if parameters::Entity::find_by_id(PARAM_REQUIRE_OPEN_TILL)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        return;
    }

    let parameter = parameters::ActiveModel {
        key: Set(PARAM_REQUIRE_OPEN_TILL.to_string()),
        value: Set("false".to_string()),
        description: Set(Some(
            "Require an open till session before allowing transfers".to_string(),
        )),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = parameter.insert(db).await {
        eprintln!("Failed to insert parameter: {e}");
    } else {
        println!("  Created parameter {PARAM_REQUIRE_OPEN_TILL}");
    }
}

async fn seed_float(db: &DatabaseConnection) {
    let currency = usd_id(db).await;
    let float_ledger = FloatLedgerRepository::new(db.clone());

    match float_ledger
        .deposit(
            id(PLATFORM_ORG_ID),
            id(ORIGIN_ORG_ID),
            currency,
            dec!(10000),
            "Initial float funding",
            &Actor::system(),
        )
        .await
    {
        Ok(change) => println!("  Origin float funded: {}", change.new_balance),
        Err(e) => eprintln!("Failed to fund origin float: {e}"),
    }
}

async fn seed_gl_accounts(db: &DatabaseConnection) {
    let currency = usd_id(db).await;

    // Till cash accounts, bound to the custody accounts.
    let tills = custody_accounts::Entity::find()
        .filter(custody_accounts::Column::Kind.eq(CustodyKind::Till))
        .all(db)
        .await
        .unwrap_or_default();
    for till in tills {
        ensure_gl_account(
            db,
            till.organization_id,
            "1010",
            &format!("Till cash - {}", till.name),
            GlAccountType::Asset,
            currency,
            Some((GlEntityKind::CustodyAccount, till.id)),
        )
        .await;
    }

    // Float payable accounts, bound to the org balances.
    let floats = org_balances::Entity::find().all(db).await.unwrap_or_default();
    for float in floats {
        ensure_gl_account(
            db,
            float.dest_org_id,
            "2010",
            "Float payable",
            GlAccountType::Liability,
            currency,
            Some((GlEntityKind::OrgBalance, float.id)),
        )
        .await;
    }

    // Charge accounts bound to the definitions (origin org books).
    for (code, charge_id, name, account_type) in [
        (
            "4010",
            COMMISSION_CHARGE_ID,
            "Commission revenue",
            GlAccountType::Revenue,
        ),
        (
            "2210",
            TAX_CHARGE_ID,
            "Tax collected",
            GlAccountType::Liability,
        ),
    ] {
        ensure_gl_account(
            db,
            id(ORIGIN_ORG_ID),
            code,
            name,
            account_type,
            currency,
            Some((GlEntityKind::Charge, id(charge_id))),
        )
        .await;
    }

    // Named system accounts on both agency books.
    for org_id in [ORIGIN_ORG_ID, DEST_ORG_ID] {
        ensure_gl_account(
            db,
            id(org_id),
            "2110",
            "Payable to beneficiaries",
            GlAccountType::Liability,
            currency,
            None,
        )
        .await;
        ensure_gl_account(
            db,
            id(org_id),
            "2130",
            "Float in transit",
            GlAccountType::Liability,
            currency,
            None,
        )
        .await;
    }
}

async fn ensure_gl_account(
    db: &DatabaseConnection,
    organization_id: Uuid,
    code: &str,
    name: &str,
    account_type: GlAccountType,
    currency_id: Uuid,
    binding: Option<(GlEntityKind, Uuid)>,
) {
    let existing = gl_accounts::Entity::find()
        .filter(gl_accounts::Column::OrganizationId.eq(organization_id))
        .filter(gl_accounts::Column::Code.eq(code))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        return;
    }

    let (entity_kind, entity_id) = match binding {
        Some((kind, entity)) => (Some(kind), Some(entity)),
        None => (None, None),
    };

    let account = gl_accounts::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        account_type: Set(account_type),
        currency_id: Set(currency_id),
        entity_kind: Set(entity_kind),
        entity_id: Set(entity_id),
        balance: Set(Decimal::ZERO),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = account.insert(db).await {
        eprintln!("Failed to insert GL account {code} for {organization_id}: {e}");
    } else {
        println!("  Created GL account {code} ({name})");
    }
}
