use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TrendingIdea {
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub difficulty: &'static str,
    pub likes: u32,
    pub image: &'static str,
}

// Fixed showcase list, most liked first
pub const TRENDING_IDEAS: [TrendingIdea; 5] = [
    TrendingIdea {
        title: "AI Music Composer",
        description: "Create an AI system that composes original music in different genres",
        category: "AI/Music",
        difficulty: "Advanced",
        likes: 2450,
        image: "https://images.unsplash.com/photo-1511379938547-c1f69419868d",
    },
    TrendingIdea {
        title: "Smart Home Garden",
        description: "Automated indoor garden with climate control and plant monitoring",
        category: "IoT/Agriculture",
        difficulty: "Intermediate",
        likes: 1890,
        image: "https://images.unsplash.com/photo-1585320806297-9794b3e4eeae",
    },
    TrendingIdea {
        title: "AR Art Gallery",
        description: "Mobile app that turns any space into an augmented reality art exhibition",
        category: "AR/Art",
        difficulty: "Advanced",
        likes: 1675,
        image: "https://images.unsplash.com/photo-1577083552431-6e5fd75a9580",
    },
    TrendingIdea {
        title: "Eco-Friendly Smart Bin",
        description: "Automated waste sorting system using AI and sensors",
        category: "Sustainability",
        difficulty: "Intermediate",
        likes: 1450,
        image: "https://images.unsplash.com/photo-1532996122724-e3c354a0b15b",
    },
    TrendingIdea {
        title: "DIY Home Security",
        description: "Build your own smart security system with cameras and sensors",
        category: "IoT/Security",
        difficulty: "Intermediate",
        likes: 1380,
        image: "https://images.unsplash.com/photo-1558002038-1055907df827",
    },
];
