//! Integration tests against running MySQL and PostgreSQL servers.
//!
//! Set TEST_MYSQL_URL / TEST_POSTGRES_URL to run them.

use sqlutil::db::{Cursor, Dialect, MySqlCursor, PgCursor, identify};
use sqlutil::models::Value;
use sqlutil::tools::SqlUtilities;

fn env_url(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: {var} not set");
            None
        }
    }
}

#[test]
fn test_mysql_operations() {
    let Some(mysql_url) = env_url("TEST_MYSQL_URL") else {
        return;
    };

    let mut cursor = MySqlCursor::connect(&mysql_url).unwrap();
    assert_eq!(identify(&cursor).unwrap(), Dialect::MySql);

    cursor.execute("DROP TABLE IF EXISTS sqlutil_games").unwrap();
    cursor
        .execute(
            "CREATE TABLE sqlutil_games (id INT PRIMARY KEY, player_id INT, \
             name VARCHAR(50), score DECIMAL(5,2), played DATE) \
             DEFAULT CHARSET=utf8mb4",
        )
        .unwrap();
    cursor
        .execute(
            "INSERT INTO sqlutil_games VALUES \
             (1, 10, '张三', 9.50, '2024-01-02'), (2, 11, 'Bo', NULL, '2024-02-03')",
        )
        .unwrap();

    let mut utils = SqlUtilities::with_output(cursor, Vec::new()).unwrap();

    let current = utils.current_database().unwrap();
    let Some(Value::Text(database)) = current.rows[0].first().cloned() else {
        panic!("current database should be text");
    };
    assert!(utils.database_exists(&database).unwrap());

    let tables = utils.list_tables(None).unwrap();
    assert!(
        tables
            .rows
            .iter()
            .any(|row| row[0] == Value::Text("sqlutil_games".into()))
    );

    let columns = utils.show_columns("sqlutil_games").unwrap();
    assert_eq!(
        columns.columns,
        vec!["Field", "Type", "Null", "Key", "Default", "Extra"]
    );

    let stats = utils.summary_statistics("sqlutil_games", None).unwrap();
    assert_eq!(stats.len(), 2);

    let ddl = utils
        .create_table_statement("sqlutil_games")
        .unwrap()
        .unwrap();
    assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS `sqlutil_games`"));

    let found = utils.find_substring("lo", "hello").unwrap();
    assert_eq!(found.rows[0][0].to_string(), "4");

    utils
        .execute_query("DROP TABLE IF EXISTS sqlutil_games")
        .unwrap();
}

#[test]
fn test_postgres_operations() {
    let Some(pg_url) = env_url("TEST_POSTGRES_URL") else {
        return;
    };

    let mut cursor = PgCursor::connect(&pg_url).unwrap();
    assert_eq!(identify(&cursor).unwrap(), Dialect::Postgres);

    cursor.execute("DROP TABLE IF EXISTS sqlutil_games").unwrap();
    cursor
        .execute(
            "CREATE TABLE sqlutil_games (id SERIAL PRIMARY KEY, team_id INT, \
             name TEXT, score DOUBLE PRECISION, played TIMESTAMP)",
        )
        .unwrap();
    cursor
        .execute(
            "INSERT INTO sqlutil_games (team_id, name, score, played) VALUES \
             (1, 'Ann', 9.5, '2024-01-02 10:00:00'), (2, 'Bo', NULL, '2024-02-03 11:00:00')",
        )
        .unwrap();

    let mut utils = SqlUtilities::with_output(cursor, Vec::new()).unwrap();

    let current = utils.current_database().unwrap();
    let Some(Value::Text(database)) = current.rows[0].first().cloned() else {
        panic!("current database should be text");
    };
    assert!(utils.database_exists(&database).unwrap());
    assert!(!utils.database_exists("sqlutil_no_such_db").unwrap());

    let columns = utils.show_columns("sqlutil_games").unwrap();
    let id_row = columns
        .rows
        .iter()
        .find(|row| row[0] == Value::Text("id".into()))
        .unwrap();
    assert_eq!(id_row[5], Value::Text("YES".into()));

    let stats = utils.summary_statistics("sqlutil_games", None).unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].columns[1].to_lowercase(), "max_score");

    let found = utils.find_substring("lo", "hello").unwrap();
    assert_eq!(found.rows[0][0].to_string(), "4");

    utils
        .execute_query("DROP TABLE IF EXISTS sqlutil_games")
        .unwrap();
}

#[test]
fn test_mysql_values_keep_their_text() {
    let Some(mysql_url) = env_url("TEST_MYSQL_URL") else {
        return;
    };

    let mut cursor = MySqlCursor::connect(&mysql_url).unwrap();
    cursor
        .execute("SELECT CAST(9.1 AS FLOAT) AS f, CAST('2024' AS YEAR) AS y, TIME('30:15:00') AS t")
        .unwrap();
    let row = cursor.fetch_one().unwrap().unwrap();
    let cells: Vec<String> = row.iter().map(Value::to_string).collect();
    assert_eq!(cells, vec!["9.1", "2024", "30:15:00"]);
}

#[test]
fn test_mysql_procedure_prints_first_result_set() {
    let Some(mysql_url) = env_url("TEST_MYSQL_URL") else {
        return;
    };

    let mut cursor = MySqlCursor::connect(&mysql_url).unwrap();
    cursor
        .execute("DROP PROCEDURE IF EXISTS sqlutil_two_sets")
        .unwrap();
    cursor
        .execute(
            "CREATE PROCEDURE sqlutil_two_sets() \
             BEGIN SELECT 1 AS a; SELECT 2 AS b, 3 AS c; END",
        )
        .unwrap();

    let mut utils = SqlUtilities::with_output(cursor, Vec::new()).unwrap();
    let outcome = utils.call_procedure("sqlutil_two_sets", &[]).unwrap();
    assert_eq!(outcome.columns, vec!["a"]);
    assert_eq!(outcome.rows, vec![vec![Value::Int(1)]]);

    utils
        .execute_query("DROP PROCEDURE IF EXISTS sqlutil_two_sets")
        .unwrap();
}

#[test]
fn test_postgres_float_statistics_and_values() {
    let Some(pg_url) = env_url("TEST_POSTGRES_URL") else {
        return;
    };

    let mut cursor = PgCursor::connect(&pg_url).unwrap();
    cursor.execute("DROP TABLE IF EXISTS sqlutil_items").unwrap();
    cursor
        .execute(
            "CREATE TABLE sqlutil_items (id SERIAL PRIMARY KEY, price REAL, qty INT); \
             INSERT INTO sqlutil_items (price, qty) VALUES (1.0, 1), (2.0, 2)",
        )
        .unwrap();

    cursor
        .execute("SELECT 9.1::real AS r, '10:00:00+02'::timetz AS tz")
        .unwrap();
    let row = cursor.fetch_one().unwrap().unwrap();
    assert_eq!(row[0], Value::Float(9.1));
    assert_eq!(row[1].to_string(), "10:00:00+02");

    let mut utils = SqlUtilities::with_output(cursor, Vec::new()).unwrap();
    let stats = utils
        .summary_statistics("sqlutil_items", Some(&["price", "qty"]))
        .unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].columns[3].to_lowercase(), "avg_price");
    assert_eq!(stats[0].rows[0][3].to_string(), "1.5000");
    assert_eq!(stats[1].rows[0][3].to_string(), "1.5000");

    utils
        .execute_query("DROP TABLE IF EXISTS sqlutil_items")
        .unwrap();
}
