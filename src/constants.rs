pub const RECIPE_COUNT_PER_PAGE: i64 = 10;
pub const INGREDIENT_COUNT_PER_PAGE: i64 = 100;

pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 1440;

pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 10_000;

pub const MIN_INGREDIENTS: usize = 1;
pub const MAX_INGREDIENTS: usize = 50;

pub const MIN_TAGS: usize = 1;
pub const MAX_TAGS: usize = 10;

pub const TAG_COLOR_PATTERN: &str = "^#([A-Fa-f0-9]{3}|[A-Fa-f0-9]{6})$";

pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const EXPORT_CONTENT_TYPE: &str = "application/pdf";
pub const EXPORT_FILE_EXTENSION: &str = "pdf";
