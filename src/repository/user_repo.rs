// ==========================================
// 生产计数服务 - 用户仓储
// ==========================================
// 只存 bcrypt 散列, 明文密码不进入本层
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use crate::db::DbPool;
use crate::domain::user::{NewUser, User};
use crate::repository::error::RepositoryResult;

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 写入新用户; 邮箱重复时返回 UniqueConstraintViolation
    pub async fn insert(&self, user: NewUser) -> RepositoryResult<i64> {
        self.pool.run(move |conn| insert(conn, &user)).await
    }

    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_string();
        self.pool.run(move |conn| find_by_email(conn, &email)).await
    }

    pub async fn list(&self) -> RepositoryResult<Vec<User>> {
        self.pool.run(|conn| list(conn)).await
    }
}

fn map_user(row: &Row) -> SqliteResult<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        fname: row.get(3)?,
        lname: row.get(4)?,
    })
}

pub(crate) fn insert(conn: &Connection, user: &NewUser) -> RepositoryResult<i64> {
    conn.execute(
        "INSERT INTO users (email, password, fname, lname) VALUES (?1, ?2, ?3, ?4)",
        params![user.email, user.password_hash, user.fname, user.lname],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn find_by_email(conn: &Connection, email: &str) -> RepositoryResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, email, password, fname, lname FROM users WHERE email = ?1",
            params![email],
            map_user,
        )
        .optional()?;
    Ok(user)
}

pub(crate) fn list(conn: &Connection) -> RepositoryResult<Vec<User>> {
    let mut stmt =
        conn.prepare("SELECT id, email, password, fname, lname FROM users ORDER BY id ASC")?;
    let rows = stmt
        .query_map([], map_user)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::repository::error::RepositoryError;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            fname: Some("Ada".to_string()),
            lname: None,
        }
    }

    #[test]
    fn test_insert_find_and_duplicate() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let id = insert(&conn, &new_user("ada@example.com")).unwrap();
        let found = find_by_email(&conn, "ada@example.com").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.password_hash, "$2b$04$hash");
        assert!(find_by_email(&conn, "nobody@example.com").unwrap().is_none());

        let dup = insert(&conn, &new_user("ada@example.com"));
        assert!(matches!(dup, Err(RepositoryError::UniqueConstraintViolation(_))));
        assert_eq!(list(&conn).unwrap().len(), 1);
    }
}
