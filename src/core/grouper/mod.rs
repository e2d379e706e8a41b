//! # Grouper Module
//!
//! Partitions a batch of photos into per-item listings.
//!
//! ## How It Works
//! 1. Walk the images in the order given
//! 2. Optionally capture the first image as the blank reference (an empty
//!    tray) and leave it out of every group
//! 3. Drop every later image that is similar to the blank reference
//! 4. Cut the remaining images into consecutive groups of `group_size`; the
//!    last group may be short but is never empty
//!
//! Every image is decoded, even when there is no blank reference, so an
//! unreadable file aborts the whole batch instead of silently shifting the
//! group boundaries of everything after it.
//!
//! Decoding and blank comparison run in parallel; the partition itself is
//! sequential and preserves input order.

use crate::core::image::ImageRef;
use crate::core::similarity::{BoundingBoxComparator, SimilarityComparator};
use crate::error::GroupError;
use crate::events::{null_sender, Event, EventSender, GroupEvent, GroupProgress};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a batch is partitioned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingConfig {
    /// Photos per listing
    pub group_size: usize,
    /// Whether the first photo is an empty-tray reference shot
    pub first_is_blank: bool,
}

impl GroupingConfig {
    pub fn new(group_size: usize, first_is_blank: bool) -> Self {
        Self {
            group_size,
            first_is_blank,
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self::new(3, false)
    }
}

/// The photos of one listing, in capture order
#[derive(Debug, Clone, Serialize)]
pub struct ImageGroup {
    /// Position of this group in the batch
    pub index: usize,
    pub images: Vec<ImageRef>,
}

impl ImageGroup {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Everything a grouping run produced
#[derive(Debug, Clone, Serialize)]
pub struct GroupingOutcome {
    pub groups: Vec<ImageGroup>,
    /// The captured blank reference, if one was requested
    pub blank_reference: Option<ImageRef>,
    /// Images dropped for looking like the blank reference
    pub skipped: Vec<ImageRef>,
}

impl GroupingOutcome {
    /// Number of images placed into groups
    pub fn grouped_count(&self) -> usize {
        self.groups.iter().map(ImageGroup::len).sum()
    }
}

/// Groups photos into listings, dropping blank frames
pub struct ImageGrouper {
    config: GroupingConfig,
    comparator: Box<dyn SimilarityComparator>,
}

impl ImageGrouper {
    /// Grouper with the default bounding-box comparator
    pub fn new(config: GroupingConfig) -> Self {
        Self::with_comparator(config, Box::new(BoundingBoxComparator::default()))
    }

    pub fn with_comparator(config: GroupingConfig, comparator: Box<dyn SimilarityComparator>) -> Self {
        Self { config, comparator }
    }

    pub fn config(&self) -> GroupingConfig {
        self.config
    }

    /// Partition `images` without progress reporting
    pub fn group(&self, images: &[ImageRef]) -> Result<GroupingOutcome, GroupError> {
        self.group_with_events(images, &null_sender())
    }

    /// Partition `images`, reporting progress through `events`
    pub fn group_with_events(
        &self,
        images: &[ImageRef],
        events: &EventSender,
    ) -> Result<GroupingOutcome, GroupError> {
        let group_size = self.config.group_size;
        if group_size == 0 {
            return Err(GroupError::InvalidGroupSize { value: group_size });
        }

        events.send(Event::Group(GroupEvent::Started {
            total_images: images.len(),
        }));

        let (blank_reference, candidates) = match images.split_first() {
            Some((first, rest)) if self.config.first_is_blank => (Some(first), rest),
            _ => (None, images),
        };

        let blank = match blank_reference {
            Some(reference) => {
                let decoded = reference.load()?.into_owned();
                events.send(Event::Group(GroupEvent::BlankReference {
                    image: reference.label(),
                }));
                tracing::debug!(image = %reference, "captured blank reference");
                Some(decoded)
            }
            None => None,
        };

        let total = candidates.len();
        let checked = AtomicUsize::new(0);

        let blank_flags: Vec<bool> = candidates
            .par_iter()
            .map(|image_ref| -> Result<bool, GroupError> {
                let image = image_ref.load()?;
                let is_blank = match blank.as_ref() {
                    Some(reference) => self.comparator.are_similar(&image, reference)?,
                    None => false,
                };

                events.send(Event::Group(GroupEvent::Progress(GroupProgress {
                    checked: checked.fetch_add(1, Ordering::SeqCst) + 1,
                    total,
                    current: image_ref.label(),
                })));
                Ok(is_blank)
            })
            .collect::<Result<_, _>>()?;

        let mut skipped = Vec::new();
        let mut kept = Vec::with_capacity(total);
        for (image_ref, is_blank) in candidates.iter().zip(blank_flags) {
            if is_blank {
                events.send(Event::Group(GroupEvent::BlankSkipped {
                    image: image_ref.label(),
                }));
                skipped.push(image_ref.clone());
            } else {
                kept.push(image_ref.clone());
            }
        }

        let groups: Vec<ImageGroup> = kept
            .chunks(group_size)
            .enumerate()
            .map(|(index, chunk)| ImageGroup {
                index,
                images: chunk.to_vec(),
            })
            .collect();

        events.send(Event::Group(GroupEvent::Completed {
            groups: groups.len(),
            skipped: skipped.len(),
        }));
        tracing::debug!(
            input = images.len(),
            groups = groups.len(),
            skipped = skipped.len(),
            "grouped batch"
        );

        Ok(GroupingOutcome {
            groups,
            blank_reference: blank_reference.cloned(),
            skipped,
        })
    }
}

/// Partition `images` into groups of `group_size` using the default comparator
pub fn group_images(
    images: &[ImageRef],
    group_size: usize,
    first_is_blank: bool,
) -> Result<Vec<ImageGroup>, GroupError> {
    ImageGrouper::new(GroupingConfig::new(group_size, first_is_blank))
        .group(images)
        .map(|outcome| outcome.groups)
}
