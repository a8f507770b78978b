//! Submodule providing the cluster partition: one integer cluster id per
//! sample, the per-cluster sizes, and optional presentation names.

use crate::errors::PartitionError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A partition of the samples into clusters.
///
/// Kernels only ever see the dense id vector; string labels are mapped to
/// ids up front and recovered for presentation, so the hot loops index
/// plain `u32`s.
pub struct ClusterPartition {
    /// One cluster id per sample, each in `0..number_of_clusters`.
    ids: Vec<u32>,
    /// The number of samples of each cluster.
    sizes: Vec<u32>,
    /// Optional presentation names, one per cluster.
    names: Option<Vec<String>>,
}

impl ClusterPartition {
    /// Builds a partition from raw cluster ids, inferring the number of
    /// clusters as `max(ids) + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError::EmptyLabels`] when `ids` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_markers::prelude::*;
    ///
    /// let partition = ClusterPartition::from_ids(vec![0, 1, 1, 0, 2]).unwrap();
    /// assert_eq!(partition.number_of_clusters(), 3);
    /// assert_eq!(partition.sizes(), &[2, 2, 1]);
    /// ```
    pub fn from_ids(ids: Vec<u32>) -> Result<Self, PartitionError> {
        let Some(&maximum) = ids.iter().max() else {
            return Err(PartitionError::EmptyLabels);
        };
        Self::from_parts(ids, maximum + 1)
    }

    /// Builds a partition from raw cluster ids and an explicit cluster
    /// count, validating every id against it.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError::EmptyLabels`] when `ids` is empty and
    /// [`PartitionError::LabelOutOfRange`] when an id is not below
    /// `number_of_clusters`.
    pub fn from_parts(ids: Vec<u32>, number_of_clusters: u32) -> Result<Self, PartitionError> {
        if ids.is_empty() {
            return Err(PartitionError::EmptyLabels);
        }
        let mut sizes = vec![0u32; number_of_clusters as usize];
        for (position, &label) in ids.iter().enumerate() {
            if label >= number_of_clusters {
                return Err(PartitionError::LabelOutOfRange {
                    position,
                    label,
                    clusters: number_of_clusters,
                });
            }
            sizes[label as usize] += 1;
        }
        Ok(Self { ids, sizes, names: None })
    }

    /// Builds a partition from string labels, the way factor-like inputs
    /// arrive from statistical environments: distinct labels are mapped to
    /// ids in order of first appearance and retained as cluster names.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError::EmptyLabels`] when `labels` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_markers::prelude::*;
    ///
    /// let partition = ClusterPartition::from_names(&["b", "a", "b"]).unwrap();
    /// assert_eq!(partition.ids(), &[0, 1, 0]);
    /// assert_eq!(partition.cluster_name(0), "b");
    /// ```
    pub fn from_names<S: AsRef<str>>(labels: &[S]) -> Result<Self, PartitionError> {
        if labels.is_empty() {
            return Err(PartitionError::EmptyLabels);
        }
        let mut names: Vec<String> = Vec::new();
        let mut ids = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let id = names.iter().position(|name| name == label).unwrap_or_else(|| {
                names.push(label.to_owned());
                names.len() - 1
            });
            ids.push(u32::try_from(id).unwrap_or_else(|_| {
                unreachable!("Distinct label counts are bounded by the sample count.")
            }));
        }
        let partition = Self::from_ids(ids)?;
        partition.with_names(names)
    }

    /// Attaches presentation names, one per cluster.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError::NameCountMismatch`] when the number of
    /// names differs from the number of clusters.
    pub fn with_names(mut self, names: Vec<String>) -> Result<Self, PartitionError> {
        if names.len() != self.sizes.len() {
            return Err(PartitionError::NameCountMismatch {
                expected: self.sizes.len(),
                found: names.len(),
            });
        }
        self.names = Some(names);
        Ok(self)
    }

    /// Returns the cluster id of each sample.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Returns the number of samples.
    pub fn number_of_samples(&self) -> usize {
        self.ids.len()
    }

    /// Returns the number of clusters.
    pub fn number_of_clusters(&self) -> usize {
        self.sizes.len()
    }

    /// Returns the number of samples of each cluster.
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Returns the presentation name of a cluster: the attached name when
    /// present, the integer id rendered as a string otherwise.
    pub fn cluster_name(&self, cluster: usize) -> String {
        self.names
            .as_ref()
            .map_or_else(|| cluster.to_string(), |names| names[cluster].clone())
    }
}
