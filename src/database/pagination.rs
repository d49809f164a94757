use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PageContext<T> {
    pub rows: Vec<T>,
    pub total_rows: i64,
    pub next_offset: i64,
    pub prev_offset: i64,
    pub message: Option<String>,
}

impl<T> PageContext<T> {
    pub fn from_rows(rows: Vec<T>, total_rows: i64, page_size: i64, current_offset: i64) -> Self {
        if rows.is_empty() {
            return Self::no_rows();
        }
        let last_offset = ((total_rows - 1) / page_size) * page_size;
        let next_offset = (current_offset + page_size).min(last_offset.max(0));
        let prev_offset = (current_offset - page_size).max(0);

        Self {
            rows,
            total_rows,
            next_offset,
            prev_offset,
            message: Some(format!(
                "{} - {} / {}",
                current_offset,
                (current_offset + page_size).min(total_rows),
                total_rows
            )),
        }
    }

    pub fn no_rows() -> Self {
        Self {
            rows: vec![],
            total_rows: 0,
            next_offset: 0,
            prev_offset: 0,
            message: Some(String::from("No results")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rows_collapse_to_no_rows() {
        let page: PageContext<i32> = PageContext::from_rows(vec![], 0, 10, 0);
        assert_eq!(page.total_rows, 0);
        assert_eq!(page.next_offset, 0);
        assert_eq!(page.prev_offset, 0);
    }

    #[test]
    fn first_page_has_no_previous_offset() {
        let page = PageContext::from_rows(vec![1, 2, 3], 25, 10, 0);
        assert_eq!(page.prev_offset, 0);
        assert_eq!(page.next_offset, 10);
    }

    #[test]
    fn middle_page_offsets() {
        let page = PageContext::from_rows(vec![1, 2, 3], 25, 10, 10);
        assert_eq!(page.prev_offset, 0);
        assert_eq!(page.next_offset, 20);
        assert_eq!(page.message.as_deref(), Some("10 - 20 / 25"));
    }

    #[test]
    fn last_page_does_not_advance_past_the_end() {
        let page = PageContext::from_rows(vec![1, 2], 25, 10, 20);
        assert_eq!(page.next_offset, 20);
        assert_eq!(page.prev_offset, 10);
    }
}
