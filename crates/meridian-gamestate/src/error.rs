use meridian_data::{DataLoadError, TilePos};

/// Alias for `Result<T, GameError>`.
pub type GameResult<T> = Result<T, GameError>;

/// Why a session could not be constructed.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The content root is missing, unreadable, empty, or malformed.
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    /// The definitions loaded but cannot form a valid session.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Loaded definitions that are insufficient or inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    /// A session needs at least one win condition.
    #[error("no win condition defined")]
    NoWinCondition,

    /// A setting holds an unusable value.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The terrain has no tiles.
    #[error("terrain \"{name}\" has no tiles ({width}x{height})")]
    EmptyTerrain {
        /// Terrain name.
        name: String,
        /// Number of columns.
        width: u32,
        /// Number of rows.
        height: u32,
    },

    /// A unit is owned by an undefined player.
    #[error("unit \"{unit}\" is owned by unknown player \"{owner}\"")]
    UnknownOwner {
        /// The unit definition.
        unit: String,
        /// The missing player.
        owner: String,
    },

    /// A unit name does not resolve to a definition.
    #[error("{context} refers to unknown unit \"{unit}\"")]
    UnknownUnit {
        /// Where the reference appears.
        context: String,
        /// The missing unit.
        unit: String,
    },

    /// A unit to be instantiated has no hit points after inheritance.
    #[error("unit \"{0}\" has no hit points")]
    MissingHitPoints(String),

    /// A unit to be instantiated is abstract.
    #[error("unit \"{0}\" is abstract and cannot be instantiated")]
    AbstractUnit(String),

    /// A unit's fixed position lies outside the terrain.
    #[error("unit \"{unit}\" placed at {position} outside the {width}x{height} terrain")]
    OutOfBounds {
        /// The unit definition.
        unit: String,
        /// The requested position.
        position: TilePos,
        /// Terrain width.
        width: u32,
        /// Terrain height.
        height: u32,
    },

    /// More players than player ids can address.
    #[error("player #{0} exceeds the supported number of players")]
    TooManyPlayers(usize),

    /// A last-player-standing condition needs at least two sides.
    #[error("win condition \"{0}\" needs at least two players or teams")]
    NotEnoughSides(String),

    /// The event loop was borrowed while the session tried to bind to it.
    #[error("event loop is busy; sessions cannot be created during dispatch")]
    EventLoopBusy,
}
