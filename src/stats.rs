//! Year and decade distribution of the deck, to help balance the selection.

use std::{collections::BTreeMap, fmt::Display};

use crate::domain::track::Track;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Distribution {
    /// (year, count), ascending by year
    pub years: Vec<(u32, usize)>,
    /// (decade, count), ascending by decade
    pub decades: Vec<(u32, usize)>,
}

impl Distribution {
    pub fn of<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> Self {
        let mut years = BTreeMap::new();
        let mut decades = BTreeMap::new();
        for track in tracks {
            *years.entry(track.year).or_insert(0) += 1;
            *decades.entry(track.decade()).or_insert(0) += 1;
        }
        Self {
            years: years.into_iter().collect(),
            decades: decades.into_iter().collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.years.iter().map(|(_, n)| n).sum()
    }
}

impl Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "YEAR STATISTICS")?;
        for (year, count) in &self.years {
            writeln!(f, "{year}: {count:2} {}", "#".repeat(*count))?;
        }
        writeln!(f)?;
        writeln!(f, "DECADE STATISTICS")?;
        for (decade, count) in &self.decades {
            writeln!(f, "{decade}s: {count:2} {}", "#".repeat(*count))?;
        }
        writeln!(f)?;
        writeln!(f, "TOTAL")?;
        write!(f, "{} tracks", self.total())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Distribution;
    use crate::domain::{hash::ContentHash, track::Track};

    fn tracks(years: &[u32]) -> Vec<Track> {
        years
            .iter()
            .enumerate()
            .map(|(i, &year)| Track {
                path: PathBuf::from(format!("{i}.mp3")),
                title: format!("t{i}"),
                artist: "a".into(),
                year,
                duration_secs: 0.0,
                content: ContentHash::from_bytes(&[i as u8]),
            })
            .collect()
    }

    #[test]
    fn buckets_years_and_decades_ascending() {
        let tracks = tracks(&[2005, 1983, 1979, 1999, 1983]);
        let dist = Distribution::of(&tracks);

        assert_eq!(dist.years, vec![(1979, 1), (1983, 2), (1999, 1), (2005, 1)]);
        assert_eq!(
            dist.decades,
            vec![(1970, 1), (1980, 2), (1990, 1), (2000, 1)]
        );
        assert_eq!(dist.total(), 5);
    }

    #[test]
    fn empty_set_has_empty_tables() {
        let dist = Distribution::of(&[]);
        assert_eq!(dist, Distribution::default());
        assert_eq!(dist.total(), 0);
    }

    #[test]
    fn report_has_bars() {
        let tracks = tracks(&[1983, 1983, 1991]);
        let report = Distribution::of(&tracks).to_string();

        assert!(report.contains("1983:  2 ##\n"));
        assert!(report.contains("1980s:  2 ##\n"));
        assert!(report.contains("1990s:  1 #\n"));
        assert!(report.ends_with("3 tracks"));
    }
}
