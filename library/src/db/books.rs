//! Database operations for the books table.

use shelf_engine::{Book, BookId, Filter, NewBook, Order, Query};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

/// A stored book row.
#[derive(Debug)]
pub struct StoredBook {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub read: bool,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for StoredBook {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(StoredBook {
            id: row.try_get("id")?,
            isbn: row.try_get("isbn")?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            read: row.try_get("read")?,
        })
    }
}

impl From<StoredBook> for Book {
    fn from(row: StoredBook) -> Self {
        Book {
            id: row.id,
            isbn: row.isbn,
            title: row.title,
            author: row.author,
            read: row.read,
        }
    }
}

/// Insert a book and return its new id.
pub async fn insert_book(conn: &mut SqliteConnection, book: &NewBook) -> Result<BookId, sqlx::Error> {
    let result = sqlx::query("INSERT INTO books (isbn, title, author, read) VALUES (?, ?, ?, ?)")
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.read)
        .execute(conn)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Replace every column of a book by id.
///
/// Returns false when no row has that id.
pub async fn update_book(conn: &mut SqliteConnection, book: &Book) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE books SET isbn = ?, title = ?, author = ?, read = ? WHERE id = ?")
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.read)
            .bind(book.id)
            .execute(conn)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a book by id.
///
/// Returns false when no row has that id.
pub async fn delete_book(conn: &mut SqliteConnection, id: BookId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch one book by id.
pub async fn get_book(conn: &mut SqliteConnection, id: BookId) -> Result<Option<Book>, sqlx::Error> {
    let row = sqlx::query_as::<_, StoredBook>(
        "SELECT id, isbn, title, author, read FROM books WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(Book::from))
}

/// Fetch every book matching a query, in the query's order.
pub async fn select_books(conn: &mut SqliteConnection, query: &Query) -> Result<Vec<Book>, sqlx::Error> {
    let sql = format!(
        "SELECT id, isbn, title, author, read FROM books{} ORDER BY {}",
        where_clause(query.filter),
        order_clause(query.order)
    );

    let rows = sqlx::query_as::<_, StoredBook>(&sql).fetch_all(conn).await?;

    Ok(rows.into_iter().map(Book::from).collect())
}

/// Count books matching a query.
pub async fn count_books(conn: &mut SqliteConnection, query: &Query) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM books{}", where_clause(query.filter));
    let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(conn).await?;
    Ok(count)
}

fn where_clause(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "",
        Filter::Read => " WHERE read = 1",
        Filter::Unread => " WHERE read = 0",
    }
}

// NOCASE folds ASCII only, matching `Query::compare`.
fn order_clause(order: Order) -> &'static str {
    match order {
        Order::Insertion => "id ASC",
        Order::Title => "title COLLATE NOCASE ASC, id ASC",
        Order::Author => "author COLLATE NOCASE ASC, id ASC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Connection;

    async fn connection() -> SqliteConnection {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&mut conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn insert_get_update_delete() {
        let mut conn = connection().await;

        let id = insert_book(&mut conn, &NewBook::new("123", "Emma", "Jane Austen"))
            .await
            .unwrap();
        let book = get_book(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(book, NewBook::new("123", "Emma", "Jane Austen").with_id(id));

        assert!(update_book(&mut conn, &book.with_read(true)).await.unwrap());
        assert!(get_book(&mut conn, id).await.unwrap().unwrap().read);

        assert!(delete_book(&mut conn, id).await.unwrap());
        assert!(get_book(&mut conn, id).await.unwrap().is_none());
        assert!(!delete_book(&mut conn, id).await.unwrap());
        assert!(!update_book(&mut conn, &book).await.unwrap());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let mut conn = connection().await;

        let first = insert_book(&mut conn, &NewBook::new("", "A", "X")).await.unwrap();
        delete_book(&mut conn, first).await.unwrap();
        let second = insert_book(&mut conn, &NewBook::new("", "A", "X")).await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn sql_ordering_matches_in_memory_query() {
        let mut conn = connection().await;

        let titles = [("dune", true), ("Anathem", false), ("emma", true), ("Dune", false)];
        for (title, read) in titles {
            insert_book(&mut conn, &NewBook::new("", title, "X").read(read))
                .await
                .unwrap();
        }
        let everything = select_books(&mut conn, &Query::all()).await.unwrap();

        for query in [
            Query::all(),
            Query::read().ordered_by(Order::Title),
            Query::unread().ordered_by(Order::Title),
            Query::all().ordered_by(Order::Author),
        ] {
            let from_sql = select_books(&mut conn, &query).await.unwrap();
            assert_eq!(from_sql, query.select(&everything).into_vec());

            let count = count_books(&mut conn, &query).await.unwrap();
            assert_eq!(count as usize, from_sql.len());
        }
    }
}
