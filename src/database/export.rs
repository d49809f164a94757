use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use super::{
    actions::{shopping_list::build_shopping_list, users::get_user_by_id},
    error::Error,
    schema::{ShoppingListRow, Uuid},
};
use crate::constants::{EXPORT_CONTENT_TYPE, EXPORT_DATE_FORMAT, EXPORT_FILE_EXTENSION};

/// Rendering backend boundary. The SDK assembles the HTML document and
/// hands it to whatever engine the consumer wires in.
pub trait DocumentRenderer {
    fn render(&self, document: &str) -> Result<Vec<u8>, Error>;
}

/// Renderer that returns the document source bytes unchanged. Useful in
/// tests and for consumers that convert to PDF elsewhere.
pub struct PassthroughRenderer;

impl DocumentRenderer for PassthroughRenderer {
    fn render(&self, document: &str) -> Result<Vec<u8>, Error> {
        Ok(document.as_bytes().to_vec())
    }
}

pub struct ShoppingListExport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// One display line per aggregated row.
pub fn format_rows(rows: &[ShoppingListRow]) -> Vec<String> {
    rows.iter()
        .map(|row| format!("{} - {} {}", row.name, row.total_amount, row.measurement_unit))
        .collect()
}

pub fn shopping_list_document(rows: &[ShoppingListRow]) -> String {
    let mut document = String::from(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    <title>Shopping list</title>\n  </head>\n  <body>\n    <h1>Shopping list</h1>\n    <ul>\n",
    );

    format_rows(rows).iter().for_each(|line| {
        document += &format!("      <li>{line}</li>\n");
    });

    document += "    </ul>\n  </body>\n</html>\n";
    document
}

pub fn shopping_list_filename(date: DateTime<Utc>, username: &str) -> String {
    format!(
        "shopping_list_{}_{}.{}",
        date.format(EXPORT_DATE_FORMAT),
        username,
        EXPORT_FILE_EXTENSION
    )
}

/// Aggregates the user's cart, assembles the document and renders it.
/// An empty cart still produces a valid document with an empty list.
pub async fn export_shopping_list<R: DocumentRenderer>(
    user_id: Uuid,
    renderer: &R,
    pool: &Pool<Postgres>,
) -> Result<ShoppingListExport, Error> {
    let user = get_user_by_id(pool, user_id)
        .await?
        .ok_or(Error::not_found("user", user_id))?;

    let rows = build_shopping_list(user_id, pool).await?;
    let document = shopping_list_document(&rows);
    let bytes = renderer.render(&document)?;

    Ok(ShoppingListExport {
        filename: shopping_list_filename(Utc::now(), &user.username),
        content_type: EXPORT_CONTENT_TYPE,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn rows() -> Vec<ShoppingListRow> {
        vec![
            ShoppingListRow {
                name: String::from("flour"),
                total_amount: 500,
                measurement_unit: String::from("g"),
            },
            ShoppingListRow {
                name: String::from("milk"),
                total_amount: 250,
                measurement_unit: String::from("ml"),
            },
        ]
    }

    #[test]
    fn lines_follow_the_name_amount_unit_shape() {
        assert_eq!(
            format_rows(&rows()),
            vec!["flour - 500 g", "milk - 250 ml"]
        );
    }

    #[test]
    fn document_lists_every_row() {
        let document = shopping_list_document(&rows());
        assert!(document.contains("<li>flour - 500 g</li>"));
        assert!(document.contains("<li>milk - 250 ml</li>"));
        assert!(document.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn empty_list_still_renders_a_document() {
        let document = shopping_list_document(&[]);
        assert!(document.contains("<ul>"));
        assert!(!document.contains("<li>"));
    }

    #[test]
    fn filename_carries_date_and_username() {
        let date = Utc.with_ymd_and_hms(2024, 4, 12, 15, 30, 0).unwrap();
        assert_eq!(
            shopping_list_filename(date, "chef"),
            "shopping_list_2024-04-12_chef.pdf"
        );
    }

    #[test]
    fn passthrough_renderer_returns_source_bytes() {
        let bytes = PassthroughRenderer.render("<html></html>").unwrap();
        assert_eq!(bytes, b"<html></html>");
    }
}
