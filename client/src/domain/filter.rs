//! Free-text catalogue filters and partial edits to them.

/// One editable filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    /// Matches inside the title.
    Title,
    /// Matches inside the description.
    Description,
    /// Matches inside any tag.
    Tag,
}

impl FilterField {
    /// Every field, in query order.
    pub const ALL: [Self; 3] = [Self::Title, Self::Description, Self::Tag];

    /// Query-string key understood by the listing endpoint.
    pub const fn query_key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Tag => "tag",
        }
    }
}

/// Current search constraints; an empty string means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Title substring.
    pub title: String,
    /// Description substring.
    pub description: String,
    /// Tag substring.
    pub tag: String,
}

impl FilterSet {
    /// Current value of `field`.
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Title => &self.title,
            FilterField::Description => &self.description,
            FilterField::Tag => &self.tag,
        }
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::Title => &mut self.title,
            FilterField::Description => &mut self.description,
            FilterField::Tag => &mut self.tag,
        }
    }

    /// Merge a partial edit; fields absent from the patch keep their value.
    pub fn apply(&mut self, patch: FilterPatch) {
        for (field, value) in patch.into_edits() {
            *self.slot_mut(field) = value;
        }
    }

    /// Key/value pairs for the non-empty fields only, in a stable order.
    ///
    /// # Examples
    /// ```
    /// use shortflix_client::domain::FilterSet;
    ///
    /// let filters = FilterSet { title: "cats".into(), ..FilterSet::default() };
    /// assert_eq!(filters.query_pairs(), vec![("title", "cats")]);
    /// assert!(FilterSet::default().query_pairs().is_empty());
    /// ```
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        FilterField::ALL
            .into_iter()
            .map(|field| (field.query_key(), self.get(field)))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }

    /// Number of fields carrying a constraint.
    pub fn active_count(&self) -> usize {
        FilterField::ALL
            .into_iter()
            .filter(|field| !self.get(*field).is_empty())
            .count()
    }

    /// Return whether any field constrains the listing.
    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }
}

/// Partial filter edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    /// New title filter, if edited.
    pub title: Option<String>,
    /// New description filter, if edited.
    pub description: Option<String>,
    /// New tag filter, if edited.
    pub tag: Option<String>,
}

impl FilterPatch {
    /// Patch touching exactly one field.
    pub fn field(field: FilterField, value: impl Into<String>) -> Self {
        let mut patch = Self::default();
        let value = Some(value.into());
        match field {
            FilterField::Title => patch.title = value,
            FilterField::Description => patch.description = value,
            FilterField::Tag => patch.tag = value,
        }
        patch
    }

    /// Edit only the title.
    pub fn title(value: impl Into<String>) -> Self {
        Self::field(FilterField::Title, value)
    }

    /// Edit only the description.
    pub fn description(value: impl Into<String>) -> Self {
        Self::field(FilterField::Description, value)
    }

    /// Edit only the tag.
    pub fn tag(value: impl Into<String>) -> Self {
        Self::field(FilterField::Tag, value)
    }

    /// Patch that resets every field to "no constraint".
    pub fn clear_all() -> Self {
        Self {
            title: Some(String::new()),
            description: Some(String::new()),
            tag: Some(String::new()),
        }
    }

    fn into_edits(self) -> impl Iterator<Item = (FilterField, String)> {
        [
            (FilterField::Title, self.title),
            (FilterField::Description, self.description),
            (FilterField::Tag, self.tag),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}
