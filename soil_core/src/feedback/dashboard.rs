//! Feedback dashboard: summary statistics and list filtering.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FeedbackRecord, FeedbackType};
use crate::errors::CalcError;

/// Summary counts over every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub regular: usize,
    pub exit: usize,
    /// Mean of the rated records; 0 when none are rated
    pub avg_rating: f64,
    pub liked: usize,
    pub disliked: usize,
}

impl FeedbackStats {
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        let count_type = |t: FeedbackType| records.iter().filter(|r| r.feedback_type == t).count();
        let ratings: Vec<f64> = records.iter().filter_map(|r| r.rating).map(f64::from).collect();
        let avg_rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<f64>() / ratings.len() as f64
        };

        FeedbackStats {
            total: records.len(),
            regular: count_type(FeedbackType::Regular),
            exit: count_type(FeedbackType::Exit),
            avg_rating,
            liked: records.iter().filter(|r| r.liked == Some(true)).count(),
            disliked: records.iter().filter(|r| r.liked == Some(false)).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeFilter {
    #[default]
    All,
    Only(FeedbackType),
}

impl FromStr for TypeFilter {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TypeFilter::All),
            "regular" => Ok(TypeFilter::Only(FeedbackType::Regular)),
            "exit" => Ok(TypeFilter::Only(FeedbackType::Exit)),
            other => Err(CalcError::invalid_input("type", other, "Expected all, regular or exit")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatingFilter {
    #[default]
    All,
    NoRating,
    Stars(u8),
}

impl FromStr for RatingFilter {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(RatingFilter::All),
            "no-rating" => Ok(RatingFilter::NoRating),
            stars => match stars.parse::<u8>() {
                Ok(n @ 1..=5) => Ok(RatingFilter::Stars(n)),
                _ => Err(CalcError::invalid_input("rating", stars, "Expected all, no-rating or 1-5")),
            },
        }
    }
}

/// Dashboard list filter. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackFilter {
    /// Case-insensitive substring of the text or name
    pub search: String,
    pub feedback_type: TypeFilter,
    pub rating: RatingFilter,
}

impl FeedbackFilter {
    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = record.feedback_text.to_lowercase().contains(&needle)
            || record
                .name
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(&needle));

        let matches_type = match self.feedback_type {
            TypeFilter::All => true,
            TypeFilter::Only(t) => record.feedback_type == t,
        };

        let matches_rating = match self.rating {
            RatingFilter::All => true,
            RatingFilter::NoRating => record.rating.is_none(),
            RatingFilter::Stars(n) => record.rating == Some(n),
        };

        matches_search && matches_type && matches_rating
    }

    /// Matching records, in their original order.
    pub fn apply(&self, records: &[FeedbackRecord]) -> Vec<FeedbackRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::NewFeedback;

    fn records() -> Vec<FeedbackRecord> {
        vec![
            NewFeedback::regular("Asha", "", 5, "Great consolidation module").unwrap().into_record(),
            NewFeedback::regular("Ravi", "", 3, "Hydrometer needs units").unwrap().into_record(),
            NewFeedback::regular("Meera", "", 0, "Add triaxial").unwrap().into_record(),
            NewFeedback::exit(true).into_record(),
            NewFeedback::exit(false).into_record(),
            NewFeedback::exit(true).into_record(),
        ]
    }

    #[test]
    fn test_stats() {
        let stats = FeedbackStats::from_records(&records());
        assert_eq!(stats.total, 6);
        assert_eq!(stats.regular, 3);
        assert_eq!(stats.exit, 3);
        assert_eq!(stats.avg_rating, 4.0);
        assert_eq!(stats.liked, 2);
        assert_eq!(stats.disliked, 1);
    }

    #[test]
    fn test_stats_without_ratings() {
        let stats = FeedbackStats::from_records(&[NewFeedback::exit(true).into_record()]);
        assert_eq!(stats.avg_rating, 0.0);
        assert_eq!(FeedbackStats::from_records(&[]).total, 0);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let filter = FeedbackFilter {
            search: "HYDRO".to_string(),
            ..FeedbackFilter::default()
        };
        let found = filter.apply(&records());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("Ravi"));

        let by_name = FeedbackFilter {
            search: "meera".to_string(),
            ..FeedbackFilter::default()
        };
        assert_eq!(by_name.apply(&records()).len(), 1);
    }

    #[test]
    fn test_type_and_rating_filters() {
        let all = records();
        assert_eq!(FeedbackFilter::default().apply(&all).len(), 6);

        let exit = FeedbackFilter {
            feedback_type: "exit".parse().unwrap(),
            ..FeedbackFilter::default()
        };
        assert_eq!(exit.apply(&all).len(), 3);

        let unrated_regular = FeedbackFilter {
            feedback_type: "regular".parse().unwrap(),
            rating: "no-rating".parse().unwrap(),
            ..FeedbackFilter::default()
        };
        let found = unrated_regular.apply(&all);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].feedback_text, "Add triaxial");

        let five = FeedbackFilter {
            rating: RatingFilter::Stars(5),
            ..FeedbackFilter::default()
        };
        assert_eq!(five.apply(&all).len(), 1);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<RatingFilter>().unwrap(), RatingFilter::All);
        assert_eq!("4".parse::<RatingFilter>().unwrap(), RatingFilter::Stars(4));
        assert!("0".parse::<RatingFilter>().is_err());
        assert!("seven".parse::<RatingFilter>().is_err());
        assert!("urgent".parse::<TypeFilter>().is_err());
    }
}
