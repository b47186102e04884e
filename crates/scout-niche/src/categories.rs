use crate::Category;

const BUILTIN: &[(&str, &[&str])] = &[
    ("Fitness", &[
        "fitness", "workout", "gym", "exercise", "training", "muscle", "strength", "cardio",
        "yoga", "pilates", "crossfit", "bodybuilding", "weightlifting", "nutrition", "protein",
        "supplements", "health", "wellness", "diet", "personal trainer", "coach", "athlete",
        "sports", "running", "cycling",
    ]),
    ("Fashion", &[
        "fashion", "style", "outfit", "clothing", "dress", "shoes", "accessories", "beauty",
        "makeup", "skincare", "hair", "styling", "trend", "designer", "brand", "shopping",
        "retail", "model", "photoshoot", "runway",
    ]),
    ("Tech", &[
        "tech", "technology", "programming", "coding", "software", "developer", "engineer", "ai",
        "artificial intelligence", "machine learning", "data", "startup", "entrepreneur",
        "innovation", "gadgets", "apps", "digital", "cybersecurity", "blockchain", "crypto",
        "fintech", "saas",
    ]),
    ("Gaming", &[
        "gaming", "gamer", "streaming", "twitch", "youtube", "esports", "tournament", "console",
        "pc", "playstation", "xbox", "nintendo", "mobile games", "strategy", "rpg", "fps", "mmo",
        "indie games", "game development",
    ]),
    ("Food", &[
        "food", "cooking", "recipe", "chef", "restaurant", "cuisine", "dining", "baking",
        "pastry", "kitchen", "ingredients", "healthy eating", "vegan", "vegetarian", "organic",
        "farm to table", "foodie", "culinary", "gastronomy",
    ]),
    ("Travel", &[
        "travel", "traveling", "tourism", "vacation", "adventure", "explore", "destination",
        "wanderlust", "backpacking", "solo travel", "luxury travel", "hotels", "airbnb",
        "flights", "passport", "visa", "culture", "photography",
    ]),
    ("Business", &[
        "business", "entrepreneur", "startup", "marketing", "sales", "finance", "investment",
        "consulting", "strategy", "leadership", "management", "networking", "conference",
        "speaker", "mentor", "coaching", "success",
    ]),
    ("Education", &[
        "education", "learning", "teaching", "teacher", "professor", "student", "university",
        "college", "course", "tutorial", "training", "skill", "knowledge", "research",
        "academic", "scholar", "degree", "certification",
    ]),
    ("Entertainment", &[
        "entertainment", "comedy", "actor", "actress", "performer", "show", "movie", "film",
        "tv", "television", "series", "drama", "music", "singer", "artist", "celebrity",
        "influencer", "content creator",
    ]),
    ("Lifestyle", &[
        "lifestyle", "life", "daily", "routine", "motivation", "inspiration", "mindfulness",
        "meditation", "self-care", "productivity", "organization", "minimalism",
        "sustainability", "eco-friendly", "home", "family", "relationships",
    ]),
    ("Beauty", &[
        "beauty", "makeup", "skincare", "cosmetics", "skincare routine", "tutorial",
        "beauty tips", "products", "reviews", "transformation", "glow up", "hair care",
        "nail art", "fashion", "style", "aesthetic",
    ]),
    ("Health", &[
        "health", "medical", "doctor", "nurse", "healthcare", "wellness", "mental health",
        "therapy", "counseling", "meditation", "mindfulness", "nutrition", "diet", "supplements",
        "vitamins", "wellness coach",
    ]),
    ("Finance", &[
        "finance", "money", "investment", "trading", "stocks", "crypto", "budgeting", "saving",
        "debt", "credit", "banking", "financial planning", "wealth", "retirement", "insurance",
        "tax", "economy",
    ]),
    ("Sports", &[
        "sports", "athlete", "team", "competition", "championship", "league", "football",
        "soccer", "basketball", "tennis", "golf", "swimming", "cycling", "running", "marathon",
        "olympics", "coach", "training",
    ]),
    ("Art", &[
        "art", "artist", "painting", "drawing", "sculpture", "gallery", "exhibition", "creative",
        "design", "illustration", "digital art", "photography", "visual", "aesthetic",
        "inspiration", "portfolio",
    ]),
    ("Music", &[
        "music", "musician", "singer", "songwriter", "producer", "dj", "concert", "album",
        "single", "recording", "studio", "instrument", "guitar", "piano", "drums", "band",
        "performance", "live music",
    ]),
    ("Parenting", &[
        "parenting", "mom", "dad", "mother", "father", "family", "kids", "children", "baby",
        "toddler", "parenting tips", "childcare", "education", "activities", "family life",
        "work-life balance",
    ]),
    ("DIY", &[
        "diy", "craft", "handmade", "tutorial", "project", "home improvement", "woodworking",
        "sewing", "knitting", "crochet", "pottery", "jewelry", "upcycling", "repair",
        "construction", "tools", "workshop",
    ]),
    ("Photography", &[
        "photography", "photographer", "photo", "camera", "lens", "shooting", "portrait",
        "landscape", "wedding", "event", "studio", "editing", "photoshop", "lightroom",
        "equipment", "technique", "composition",
    ]),
];

pub(crate) fn builtin() -> Vec<Category> {
    BUILTIN
        .iter()
        .map(|(name, keywords)| Category {
            name: (*name).to_string(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            weight: 1.0,
        })
        .collect()
}
