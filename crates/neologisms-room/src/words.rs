//! The word corpus boards are drawn from.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Label words. Every entry is distinct, lowercase and a single token so
/// it can double as a room-id fragment.
pub const WORDS: &[&str] = &[
    "acorn", "alarm", "amber", "anchor", "angel", "apple", "arrow", "ash", "atlas", "autumn",
    "badge", "bakery", "balloon", "bamboo", "banjo", "barn", "basket", "beacon", "beard", "bee",
    "bell", "berry", "blade", "blanket", "bloom", "bone", "book", "bottle", "bridge", "broom",
    "bubble", "bucket", "butter", "cabin", "cactus", "camera", "candle", "canyon", "carpet",
    "castle", "cave", "chalk", "cherry", "chess", "chimney", "circus", "cliff", "clock", "cloud",
    "clover", "coal", "coast", "comet", "compass", "copper", "coral", "cotton", "crown", "crystal",
    "dagger", "daisy", "desert", "diamond", "dragon", "drum", "eagle", "echo", "engine", "feather",
    "fence", "fern", "festival", "fiddle", "flag", "flame", "flute", "fog", "forest", "fossil",
    "fountain", "fox", "frost", "galaxy", "garden", "ghost", "giant", "glacier", "glass", "glove",
    "goblin", "gold", "granite", "grape", "gravity", "harbor", "harp", "harvest", "hammer",
    "helmet", "hive", "honey", "horizon", "horn", "island", "ivory", "ivy", "jacket", "jade",
    "jelly", "jungle", "kettle", "key", "kite", "knight", "ladder", "lagoon", "lantern", "lava",
    "lemon", "library", "lighthouse", "lily", "lion", "lizard", "magnet", "maple", "marble",
    "market", "mask", "meadow", "mirror", "mist", "moon", "moss", "mountain", "mushroom", "needle",
    "nest", "night", "oasis", "ocean", "olive", "opera", "orbit", "orchard", "otter", "owl",
    "paint", "palace", "paper", "parade", "parrot", "pearl", "pebble", "pepper", "piano", "pillow",
    "pilot", "pine", "pirate", "planet", "plum", "pocket", "pond", "potato", "prism", "pumpkin",
    "puzzle", "pyramid", "quartz", "quill", "rabbit", "radio", "rain", "rainbow", "raven", "reef",
    "ribbon", "river", "robot", "rocket", "rope", "rose", "ruby", "saddle", "sail", "salt",
    "sand", "satellite", "scarf", "scroll", "shadow", "shell", "shield", "silk", "silver",
    "skeleton", "sled", "smoke", "snail", "snow", "spider", "spoon", "spring", "stable", "star",
    "statue", "storm", "straw", "stream", "sugar", "summit", "sun", "swamp", "sword", "tail",
    "temple", "thunder", "tiger", "tin", "torch", "tower", "train", "treasure", "tulip", "tunnel",
    "turtle", "umbrella", "valley", "velvet", "violin", "volcano", "wagon", "wave", "whale",
    "wheel", "whistle", "willow", "window", "winter", "wizard", "wolf", "wool", "yarn", "zebra",
];

/// Picks `count` distinct words.
///
/// Returns fewer than `count` only if the corpus is smaller than that.
pub fn random_words<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    WORDS
        .choose_multiple(rng, count)
        .map(|w| (*w).to_owned())
        .collect()
}
