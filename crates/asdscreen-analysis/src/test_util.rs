use asdscreen_dataset::{
    group::AgeGroup, record::NormalizedRecord, record::ITEM_COUNT, vocabulary::Gender,
};

/// Builder for complete-case records with all-negative defaults.
pub(crate) struct RecordBuilder(NormalizedRecord);

pub(crate) fn record() -> RecordBuilder {
    RecordBuilder(NormalizedRecord {
        group: AgeGroup::Adult,
        source_line: 2,
        items: [Some(false); ITEM_COUNT],
        age_years: Some(30.0),
        gender: Some(Gender::Male),
        ethnicity: None,
        country: None,
        jaundice: Some(false),
        family_history: Some(false),
        completer: None,
        used_app_before: Some(false),
        score: Some(0),
        outcome: Some(false),
    })
}

impl RecordBuilder {
    pub(crate) fn group(mut self, group: AgeGroup) -> Self {
        self.0.group = group;
        self
    }

    /// Sets every item and the matching total score.
    pub(crate) fn items(mut self, items: [bool; ITEM_COUNT]) -> Self {
        self.0.items = items.map(Some);
        self.0.score = Some(items.iter().map(|&b| u8::from(b)).sum());
        self
    }

    pub(crate) fn item(mut self, index: usize, value: Option<bool>) -> Self {
        self.0.items[index] = value;
        self
    }

    pub(crate) fn age(mut self, age_years: Option<f64>) -> Self {
        self.0.age_years = age_years;
        self
    }

    pub(crate) fn gender(mut self, gender: Gender) -> Self {
        self.0.gender = Some(gender);
        self
    }

    pub(crate) fn jaundice(mut self, value: Option<bool>) -> Self {
        self.0.jaundice = value;
        self
    }

    pub(crate) fn family_history(mut self, value: Option<bool>) -> Self {
        self.0.family_history = value;
        self
    }

    pub(crate) fn score(mut self, score: Option<u8>) -> Self {
        self.0.score = score;
        self
    }

    pub(crate) fn outcome(mut self, outcome: Option<bool>) -> Self {
        self.0.outcome = outcome;
        self
    }

    pub(crate) fn build(self) -> NormalizedRecord {
        self.0
    }
}

/// Records whose outcome is positive exactly when items A1..A3 are all endorsed.
pub(crate) fn separable_records(group: AgeGroup, n: usize) -> Vec<NormalizedRecord> {
    (0..n)
        .map(|i| {
            let mut items = [false; ITEM_COUNT];
            for (j, item) in items.iter_mut().enumerate() {
                *item = (i >> j) & 1 == 1;
            }
            let positive = items[0] && items[1] && items[2];
            let age = f64::from(u32::try_from(i % 40).unwrap_or(0)) + 18.0;
            let gender = if i % 3 == 0 {
                Gender::Male
            } else {
                Gender::Female
            };
            record()
                .group(group)
                .items(items)
                .age(Some(age))
                .gender(gender)
                .jaundice(Some(i % 5 == 0))
                .family_history(Some(i % 7 == 0))
                .outcome(Some(positive))
                .build()
        })
        .collect()
}
