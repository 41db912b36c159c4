#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const SAMPLE_SALES: &str = "\
order_id,product_id,order_date,customer_name,city,unit_price,quantity,discount
1,P1,2023-01-15, alice ,new york,10,2,0.1
,P2,2023-01-16,bob,boston,5,1,
3,P3,not-a-date,carol o'brien,  SAN JOSE ,4,3,
4,,2023-02-01,dave,austin,7,1,0.5
";

pub const SAMPLE_CLEANED: &str = "\
order_id,product_id,order_date,customer_name,city,unit_price,quantity,discount,gross_amount,discount_amount,net_amount,order_year,order_month,order_month_name,order_day
1,P1,2023-01-15,Alice,New York,10,2,0.1,20,2.0,18.0,2023,1,Jan,15
3,P3,,Carol O'Brien,San Jose,4,3,0.0,12,0.0,12.0,,,,
";

/// Scratch directory laid out like a project root (`data/`, `outputs/`).
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` to a path relative to the workspace, creating
    /// parent directories as needed.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    pub fn write_raw_sales(&self, contents: &str) -> PathBuf {
        self.write("data/raw_sales_data.csv", contents)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.temp_dir.path().join(relative)).expect("read workspace file")
    }

    pub fn cleaned_output(&self) -> PathBuf {
        self.temp_dir.path().join("outputs").join("cleaned_sales_data.csv")
    }
}
