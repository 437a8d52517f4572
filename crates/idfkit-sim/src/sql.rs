// Dweve idfkit - EnergyPlus Model Toolkit
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Time series from the SQLite output (`eplusout.sql`).

use crate::error::{SimError, SimResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Which environments to read data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Design days and design run periods.
    Sizing,
    /// Weather-file run periods.
    Annual,
}

impl Environment {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Sizing => "sizing",
            Self::Annual => "annual",
        }
    }
}

impl FromStr for Environment {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sizing" => Ok(Self::Sizing),
            "annual" => Ok(Self::Annual),
            _ => Err(SimError::InvalidArgument(format!(
                "environment must be 'sizing' or 'annual', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects one series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeseriesQuery {
    pub variable_name: String,
    /// Defaults to the first key reported for the variable.
    pub key_value: Option<String>,
    /// `Hourly`, `Daily`, ... as written by EnergyPlus.
    pub frequency: Option<String>,
    pub environment: Option<Environment>,
}

impl TimeseriesQuery {
    pub fn new(variable_name: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            ..Default::default()
        }
    }
}

/// Min, max and mean of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// One series read from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesResult {
    pub variable_name: String,
    pub key_value: String,
    pub units: String,
    pub frequency: String,
    pub timestamps: Vec<String>,
    pub values: Vec<f64>,
}

impl TimeseriesResult {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `None` for an empty series.
    pub fn statistics(&self) -> Option<Statistics> {
        if self.values.is_empty() {
            return None;
        }
        let (min, max, sum) = self.values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );
        Some(Statistics {
            min,
            max,
            mean: sum / self.values.len() as f64,
        })
    }

    /// Column header in EnergyPlus CSV style, `KEY:Name [units](Frequency)`.
    pub fn column_name(&self) -> String {
        format!(
            "{}:{} [{}]({})",
            self.key_value, self.variable_name, self.units, self.frequency
        )
    }

    /// Write `timestamp,value` rows to a CSV file; returns the row count.
    pub fn to_csv(&self, path: &Path) -> SimResult<usize> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["Date/Time".to_string(), self.column_name()])?;
        for (ts, value) in self.timestamps.iter().zip(&self.values) {
            writer.write_record([ts.clone(), value.to_string()])?;
        }
        writer.flush()?;
        Ok(self.values.len())
    }
}

const DICTIONARY_SQL: &str = "
SELECT ReportDataDictionaryIndex, KeyValue, Name, Units, ReportingFrequency
FROM ReportDataDictionary
WHERE Name = ?1 COLLATE NOCASE
  AND (?2 IS NULL OR KeyValue = ?2 COLLATE NOCASE)
  AND (?3 IS NULL OR ReportingFrequency = ?3 COLLATE NOCASE)
ORDER BY ReportDataDictionaryIndex
LIMIT 1";

const DATA_SQL: &str = "
SELECT t.Year, t.Month, t.Day, t.Hour, t.Minute, rd.Value
FROM ReportData rd
JOIN Time t ON rd.TimeIndex = t.TimeIndex
LEFT JOIN EnvironmentPeriods ep ON t.EnvironmentPeriodIndex = ep.EnvironmentPeriodIndex
WHERE rd.ReportDataDictionaryIndex = ?1
  AND (t.WarmupFlag IS NULL OR t.WarmupFlag = 0)
  AND (?2 IS NULL
       OR (?2 = 'sizing' AND ep.EnvironmentType IN (1, 2))
       OR (?2 = 'annual' AND ep.EnvironmentType = 3))
ORDER BY rd.TimeIndex";

/// Read-only handle on `eplusout.sql`.
pub struct SqlOutput {
    conn: Connection,
}

impl SqlOutput {
    pub fn open(path: &Path) -> SimResult<Self> {
        if !path.is_file() {
            return Err(SimError::NoSqlOutput);
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Read one series.
    ///
    /// Warmup days are skipped. A variable with no matching dictionary
    /// entry is [`SimError::NotFound`].
    pub fn query_timeseries(&self, query: &TimeseriesQuery) -> SimResult<TimeseriesResult> {
        let entry = self
            .conn
            .query_row(
                DICTIONARY_SQL,
                params![query.variable_name, query.key_value, query.frequency],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((index, key, name, units, frequency)) = entry else {
            let mut msg = format!("Variable '{}'", query.variable_name);
            if let Some(key) = &query.key_value {
                msg.push_str(&format!(" for key '{}'", key));
            }
            if let Some(freq) = &query.frequency {
                msg.push_str(&format!(" at frequency '{}'", freq));
            }
            msg.push_str(" not found in SQL output");
            return Err(SimError::NotFound(msg));
        };

        let mut stmt = self.conn.prepare(DATA_SQL)?;
        let environment = query.environment.map(|e| e.as_str());
        let rows = stmt.query_map(params![index, environment], |row| {
            Ok((
                format_timestamp(
                    row.get::<_, Option<i64>>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                ),
                row.get::<_, f64>(5)?,
            ))
        })?;

        let mut timestamps = Vec::new();
        let mut values = Vec::new();
        for row in rows {
            let (ts, value) = row?;
            timestamps.push(ts);
            values.push(value);
        }
        debug!("Read {} points for {}", values.len(), name);

        Ok(TimeseriesResult {
            variable_name: name,
            key_value: key.unwrap_or_default(),
            units: units.unwrap_or_default(),
            frequency: frequency.unwrap_or_default(),
            timestamps,
            values,
        })
    }

    /// Every `(key, name, frequency)` in the report dictionary.
    #[cfg(test)]
    pub(crate) fn available_series(&self) -> SimResult<Vec<(String, String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT KeyValue, Name, ReportingFrequency FROM ReportDataDictionary
             ORDER BY ReportDataDictionaryIndex",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            ))
        })?;
        Ok(rows.collect::<Result<Vec<_>, rusqlite::Error>>()?)
    }
}

/// `YYYY-MM-DD HH:MM`, or `MM-DD HH:MM` when the year is not recorded.
///
/// Hours run 1..=24 as EnergyPlus reports interval ends.
fn format_timestamp(
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    hour: Option<i64>,
    minute: Option<i64>,
) -> String {
    let (month, day) = (month.unwrap_or(0), day.unwrap_or(0));
    let (hour, minute) = (hour.unwrap_or(0), minute.unwrap_or(0));
    match year.filter(|y| *y > 0) {
        Some(year) => format!(
            "{:04}-{:02}-{:02} {:02}:{:02}",
            year, month, day, hour, minute
        ),
        None => format!("{:02}-{:02} {:02}:{:02}", month, day, hour, minute),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal EnergyPlus output database: one annual day and one
    /// warmup hour for two zones.
    pub(crate) fn fixture(conn: &Connection) {
        conn.execute_batch(
            r#"
            CREATE TABLE EnvironmentPeriods (
                EnvironmentPeriodIndex INTEGER PRIMARY KEY,
                SimulationIndex INTEGER,
                EnvironmentName TEXT,
                EnvironmentType INTEGER
            );
            CREATE TABLE Time (
                TimeIndex INTEGER PRIMARY KEY,
                Year INTEGER, Month INTEGER, Day INTEGER, Hour INTEGER, Minute INTEGER,
                Dst INTEGER, Interval INTEGER, IntervalType INTEGER,
                SimulationDays INTEGER, DayType TEXT,
                EnvironmentPeriodIndex INTEGER, WarmupFlag INTEGER
            );
            CREATE TABLE ReportDataDictionary (
                ReportDataDictionaryIndex INTEGER PRIMARY KEY,
                IsMeter INTEGER, Type TEXT, IndexGroup TEXT, TimestepType TEXT,
                KeyValue TEXT, Name TEXT, ReportingFrequency TEXT,
                ScheduleName TEXT, Units TEXT
            );
            CREATE TABLE ReportData (
                ReportDataIndex INTEGER PRIMARY KEY,
                TimeIndex INTEGER,
                ReportDataDictionaryIndex INTEGER,
                Value REAL
            );
            INSERT INTO EnvironmentPeriods VALUES (1, 1, 'WINTER DESIGN DAY', 1);
            INSERT INTO EnvironmentPeriods VALUES (2, 1, 'RUN PERIOD 1', 3);
            INSERT INTO Time VALUES (1, 2017, 1, 21, 1, 0, 0, 60, 1, 1, 'WinterDesignDay', 1, 0);
            INSERT INTO Time VALUES (2, 2017, 1, 1, 1, 0, 0, 60, 1, 1, 'Sunday', 2, 1);
            INSERT INTO Time VALUES (3, 2017, 1, 1, 1, 0, 0, 60, 1, 1, 'Sunday', 2, 0);
            INSERT INTO Time VALUES (4, 2017, 1, 1, 2, 0, 0, 60, 1, 1, 'Sunday', 2, 0);
            INSERT INTO Time VALUES (5, 2017, 1, 1, 3, 0, 0, 60, 1, 1, 'Sunday', 2, 0);
            INSERT INTO ReportDataDictionary VALUES
                (1, 0, 'Avg', 'Zone', 'Zone', 'OFFICE', 'Zone Mean Air Temperature', 'Hourly', NULL, 'C');
            INSERT INTO ReportDataDictionary VALUES
                (2, 0, 'Avg', 'Zone', 'Zone', 'LAB', 'Zone Mean Air Temperature', 'Hourly', NULL, 'C');
            INSERT INTO ReportDataDictionary VALUES
                (3, 1, 'Sum', 'Facility:Electricity', 'Zone', '', 'Electricity:Facility', 'Hourly', NULL, 'J');
            INSERT INTO ReportData VALUES (1, 1, 1, 15.0);
            INSERT INTO ReportData VALUES (2, 2, 1, 99.0);
            INSERT INTO ReportData VALUES (3, 3, 1, 20.0);
            INSERT INTO ReportData VALUES (4, 4, 1, 21.0);
            INSERT INTO ReportData VALUES (5, 5, 1, 22.0);
            INSERT INTO ReportData VALUES (6, 3, 2, 18.0);
            INSERT INTO ReportData VALUES (7, 3, 3, 3600.0);
            "#,
        )
        .unwrap();
    }

    fn output() -> SqlOutput {
        let conn = Connection::open_in_memory().unwrap();
        fixture(&conn);
        SqlOutput::from_connection(conn)
    }

    #[test]
    fn test_default_key_skips_warmup() {
        let sql = output();
        let result = sql
            .query_timeseries(&TimeseriesQuery::new("zone mean air temperature"))
            .unwrap();
        assert_eq!(result.key_value, "OFFICE");
        assert_eq!(result.units, "C");
        assert_eq!(result.frequency, "Hourly");
        assert_eq!(result.values, vec![15.0, 20.0, 21.0, 22.0]);
        assert_eq!(result.timestamps[1], "2017-01-01 01:00");

        let stats = result.statistics().unwrap();
        assert_eq!(stats.min, 15.0);
        assert_eq!(stats.max, 22.0);
        assert_eq!(stats.mean, 19.5);
    }

    #[test]
    fn test_key_and_environment_filters() {
        let sql = output();
        let query = TimeseriesQuery {
            variable_name: "Zone Mean Air Temperature".into(),
            key_value: Some("lab".into()),
            ..Default::default()
        };
        let lab = sql.query_timeseries(&query).unwrap();
        assert_eq!(lab.key_value, "LAB");
        assert_eq!(lab.values, vec![18.0]);

        let annual = TimeseriesQuery {
            environment: Some(Environment::Annual),
            ..TimeseriesQuery::new("Zone Mean Air Temperature")
        };
        assert_eq!(sql.query_timeseries(&annual).unwrap().values, vec![20.0, 21.0, 22.0]);

        let sizing = TimeseriesQuery {
            environment: Some(Environment::Sizing),
            ..TimeseriesQuery::new("Zone Mean Air Temperature")
        };
        assert_eq!(sql.query_timeseries(&sizing).unwrap().values, vec![15.0]);
    }

    #[test]
    fn test_unknown_variable() {
        let sql = output();
        let query = TimeseriesQuery {
            frequency: Some("Daily".into()),
            ..TimeseriesQuery::new("Zone Mean Air Temperature")
        };
        let err = sql.query_timeseries(&query).unwrap_err();
        assert!(matches!(err, SimError::NotFound(_)));
        assert!(err.to_string().contains("at frequency 'Daily'"));
    }

    #[test]
    fn test_csv_export() {
        let sql = output();
        let result = sql
            .query_timeseries(&TimeseriesQuery::new("Electricity:Facility"))
            .unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        assert_eq!(result.to_csv(&path).unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date/Time,:Electricity:Facility [J](Hourly)"));
        assert_eq!(lines.next(), Some("2017-01-01 01:00,3600"));
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("Annual".parse::<Environment>().unwrap(), Environment::Annual);
        assert!("weekly".parse::<Environment>().is_err());
    }

    #[test]
    fn test_missing_database() {
        let err = SqlOutput::open(Path::new("/no/such/eplusout.sql")).err().unwrap();
        assert!(matches!(err, SimError::NoSqlOutput));
    }

    #[test]
    fn test_available_series() {
        let series = output().available_series().unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[2].1, "Electricity:Facility");
    }
}
