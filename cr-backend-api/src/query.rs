use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DiffListQuery {
    pub search: Option<String>,
    pub repository: Option<String>,
    pub issues: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CheckQuery {
    pub publishable: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub since: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub repository: Option<String>,
    pub analyzer: Option<String>,
    pub check: Option<String>,
    pub since: NaiveDate,
}
