//! Channels, channel focus and knob slots.

/// A physical channel of the stereo engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Left channel.
    Left,
    /// Right channel.
    Right,
}

impl Channel {
    /// Both physical channels, left first.
    pub const ALL: [Channel; 2] = [Channel::Left, Channel::Right];

    /// Row index of this channel in the per-channel matrices.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// What the knobs currently control.
///
/// Exactly one focus is active at a time. [`ChannelFocus::Settings`] is a
/// temporary override: entering it remembers the performance focus, leaving
/// it restores that focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelFocus {
    /// Knobs address the left channel only.
    Left,
    /// Knobs address the right channel only.
    Right,
    /// Knobs address both channels, each offset by its remembered delta.
    #[default]
    Both,
    /// Knobs edit the persisted settings.
    Settings,
}

impl ChannelFocus {
    /// Returns the physical channels a performance write with this focus
    /// addresses. Settings focus addresses none.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ostinato_platform::{Channel, ChannelFocus};
    ///
    /// assert_eq!(ChannelFocus::Both.channels(), &[Channel::Left, Channel::Right]);
    /// assert_eq!(ChannelFocus::Right.channels(), &[Channel::Right]);
    /// assert!(ChannelFocus::Settings.channels().is_empty());
    /// ```
    pub const fn channels(self) -> &'static [Channel] {
        match self {
            ChannelFocus::Left => &[Channel::Left],
            ChannelFocus::Right => &[Channel::Right],
            ChannelFocus::Both => &Channel::ALL,
            ChannelFocus::Settings => &[],
        }
    }

    /// Returns true if a performance write with this focus reaches `channel`.
    #[inline]
    pub const fn addresses(self, channel: Channel) -> bool {
        matches!(
            (self, channel),
            (ChannelFocus::Both, _)
                | (ChannelFocus::Left, Channel::Left)
                | (ChannelFocus::Right, Channel::Right)
        )
    }

    /// The single channel this focus isolates, if any.
    #[inline]
    pub const fn single(self) -> Option<Channel> {
        match self {
            ChannelFocus::Left => Some(Channel::Left),
            ChannelFocus::Right => Some(Channel::Right),
            _ => None,
        }
    }

    /// Maps a two-position toggle index onto a performance focus.
    ///
    /// Position 0 selects Left, anything else Right.
    #[inline]
    pub const fn from_toggle_position(position: u8) -> Self {
        if position == 0 {
            ChannelFocus::Left
        } else {
            ChannelFocus::Right
        }
    }
}

/// One of the four logical knob controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSlot {
    /// Dry/wet mix; input gain in settings view.
    Blend,
    /// Loop start offset; stereo width in settings view.
    Start,
    /// Filter cutoff; filter type in settings view.
    Tone,
    /// Loop length and direction; loop sync in settings view.
    Size,
}

impl ParameterSlot {
    /// All slots in knob order.
    pub const ALL: [ParameterSlot; 4] = [
        ParameterSlot::Blend,
        ParameterSlot::Start,
        ParameterSlot::Tone,
        ParameterSlot::Size,
    ];

    /// Order in which knobs are visited on a running tick.
    ///
    /// Loop geometry (Size, Start) is visited before mix and filter.
    pub const SCAN_ORDER: [ParameterSlot; 4] = [
        ParameterSlot::Size,
        ParameterSlot::Start,
        ParameterSlot::Blend,
        ParameterSlot::Tone,
    ];

    /// Knob / column index of this slot.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ParameterSlot::Blend => 0,
            ParameterSlot::Start => 1,
            ParameterSlot::Tone => 2,
            ParameterSlot::Size => 3,
        }
    }

    /// Returns the slot bound to knob `index`, if any.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ParameterSlot::Blend),
            1 => Some(ParameterSlot::Start),
            2 => Some(ParameterSlot::Tone),
            3 => Some(ParameterSlot::Size),
            _ => None,
        }
    }

    /// Short lowercase name, as used in scripts and logs.
    pub const fn name(self) -> &'static str {
        match self {
            ParameterSlot::Blend => "blend",
            ParameterSlot::Start => "start",
            ParameterSlot::Tone => "tone",
            ParameterSlot::Size => "size",
        }
    }
}
