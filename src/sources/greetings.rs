//! Randomized greeting openers

use rand::seq::SliceRandom;

/// Openers; `{name}` is replaced with the recipient's name
pub const OPENERS: &[&str] = &[
    "Rise and shine, {name}! The world isn't going to take over itself! 🌞",
    "Hey {name}, the early bird gets the worm, but the second mouse gets the cheese! 🧀",
    "Good morning, {name}! The universe called; it wants its awesome back! 🌌",
    "Hey {name}, time to wake up and smell the possibility! Or is that coffee? ☕",
    "Top of the morning to you, {name}! Or bottom, depending on your sleep schedule. ⏰",
    "Up and at 'em, {name}! Your destiny isn't going to fulfill itself! 🚀",
    "Hey {name}, you're one in a melon! Time to rise and be fruitful! 🍉",
    "Morning, {name}! Time to get up and doughnut the impossible! 🍩",
    "Morning, {name}! The bed's loss is the world's gain! 🌍",
    "Yo, {name}! What do you call fake spaghetti? An 'Impasta'! No faking today, rise and shine! 🍝",
    "Hey {name}, what did one ocean say to the other? Nothing, they just waved. Time to make waves today! 🌊",
    "Good morning, {name}! Why did the golfer bring two pairs of pants? In case he got a hole in one. You got this one! ⛳",
];

/// Pick one opener uniformly at random and address it to `name`
#[must_use]
pub fn random_greeting(name: &str) -> String {
    let opener = OPENERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Good morning, {name}!");
    opener.replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_addressed() {
        for _ in 0..20 {
            let greeting = random_greeting("Sam");
            assert!(greeting.contains("Sam"));
            assert!(!greeting.contains("{name}"));
        }
    }

    #[test]
    fn every_opener_has_placeholder() {
        assert!(OPENERS.iter().all(|o| o.contains("{name}")));
    }
}
