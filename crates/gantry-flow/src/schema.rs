//! Schema rotation: load into a staging schema, then swap it live.
//!
//! Full-refresh pipelines never write into the published schema directly.
//! A kickoff task recreates `<schema><suffix>`, the extract tasks load into
//! it, and a final task promotes it to `<schema>` and re-grants read
//! access. Readers keep a consistent schema at all times.

use gantry_model::{ConnId, DwhEngine, TaskId, TaskNode, WorkUnit};

use crate::error::FlowError;

/// Tokens that may never appear in a read-right user name. The names are
/// spliced into GRANT statements verbatim.
const FORBIDDEN_READER_TOKENS: [&str; 8] = [
    "insert", "update", "delete", "drop", "create", "select", ";", "grant",
];

/// Validates user names destined for GRANT statements.
pub fn validate_read_right_users(users: &[String]) -> Result<(), FlowError> {
    for user in users {
        let lowered = user.to_lowercase();
        for token in FORBIDDEN_READER_TOKENS {
            if lowered.contains(token) {
                return Err(FlowError::InvalidReadRightUser {
                    user: user.clone(),
                    token: token.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn qualified(schema: &str, database: Option<&str>) -> String {
    match database {
        Some(database) => format!("\"{database}\".\"{schema}\""),
        None => format!("\"{schema}\""),
    }
}

/// GRANT statements giving `users` read access to `schema`.
///
/// Callers validate the user list first; this function only renders.
pub fn read_grant_sql(
    engine: DwhEngine,
    schema: &str,
    database: Option<&str>,
    users: &[String],
) -> String {
    let target = qualified(schema, database);
    let mut sql = String::new();
    for user in users {
        match engine {
            DwhEngine::Postgres => {
                sql.push_str(&format!("GRANT USAGE ON SCHEMA {target} TO \"{user}\";\n"));
                sql.push_str(&format!(
                    "GRANT SELECT ON ALL TABLES IN SCHEMA {target} TO \"{user}\";\n"
                ));
            }
            DwhEngine::Snowflake => {
                sql.push_str(&format!(
                    "GRANT USAGE ON SCHEMA {target} TO ROLE \"{user}\";\n"
                ));
                sql.push_str(&format!(
                    "GRANT SELECT ON ALL TABLES IN SCHEMA {target} TO ROLE \"{user}\";\n"
                ));
            }
        }
    }
    sql
}

/// Builds the `kickoff` and `final` tasks bracketing a schema rotation.
///
/// `kickoff` recreates the staging schema from scratch. `final` swaps the
/// freshly loaded staging schema live and re-grants read access to the
/// configured users. Neither task carries upstream edges yet; the caller
/// wires them around its workers.
pub fn schema_swap_tasks(
    engine: DwhEngine,
    conn: &ConnId,
    schema: &str,
    suffix: &str,
    database: Option<&str>,
    read_right_users: &[String],
) -> Result<(TaskNode, TaskNode), FlowError> {
    validate_read_right_users(read_right_users)?;

    let staging_name = format!("{schema}{suffix}");
    let staging = qualified(&staging_name, database);
    let live = qualified(schema, database);

    let kickoff_sql = match engine {
        DwhEngine::Postgres => {
            format!("DROP SCHEMA IF EXISTS {staging} CASCADE;\nCREATE SCHEMA {staging};\n")
        }
        DwhEngine::Snowflake => format!("CREATE OR REPLACE SCHEMA {staging};\n"),
    };

    let mut final_sql = match engine {
        DwhEngine::Postgres => format!(
            "DROP SCHEMA IF EXISTS {live} CASCADE;\nALTER SCHEMA {staging} RENAME TO \"{schema}\";\n"
        ),
        DwhEngine::Snowflake => format!(
            "CREATE SCHEMA IF NOT EXISTS {live};\nALTER SCHEMA {staging} SWAP WITH {live};\nDROP SCHEMA IF EXISTS {staging};\n"
        ),
    };
    final_sql.push_str(&read_grant_sql(engine, schema, database, read_right_users));

    let kickoff = TaskNode::new(
        TaskId::new("kickoff")?,
        WorkUnit::Sql {
            conn: conn.clone(),
            sql: kickoff_sql,
        },
    );
    let final_node = TaskNode::new(
        TaskId::new("final")?,
        WorkUnit::Sql {
            conn: conn.clone(),
            sql: final_sql,
        },
    );
    Ok((kickoff, final_node))
}
